//! 内容嗅探：只读文件开头，粗略判定 MIME 类型
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// 嗅探时读取的最大字节数
pub(crate) const SNIFF_LEN: usize = 8192;

/// 已知二进制格式的魔数
const SIGNATURES: &[(&[u8], &str)] = &[
    (b"%PDF-", "application/pdf"),
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xFF\xD8\xFF", "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
    (b"PK\x03\x04", "application/zip"),
    (b"\x1F\x8B", "application/gzip"),
    (b"7z\xBC\xAF\x27\x1C", "application/x-7z-compressed"),
    (b"\x7FELF", "application/x-executable"),
    (b"MZ", "application/x-dosexec"),
    (b"SQLite format 3\0", "application/vnd.sqlite3"),
];

pub fn sniff_mime(path: &Path) -> std::io::Result<&'static str> {
    let mut buf = Vec::with_capacity(SNIFF_LEN);
    File::open(path)?.take(SNIFF_LEN as u64).read_to_end(&mut buf)?;
    Ok(mime_from_bytes(&buf))
}

pub fn mime_from_bytes(buf: &[u8]) -> &'static str {
    if buf.is_empty() {
        return "inode/x-empty";
    }
    for &(magic, mime) in SIGNATURES {
        if buf.starts_with(magic) {
            return mime;
        }
    }
    if is_probably_binary(buf) {
        return "application/octet-stream";
    }

    let text = buf.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(buf);
    let start = text.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(text.len());
    let head = &text[start..text.len().min(start + 64)];
    if looks_like_json(head) {
        return "application/json";
    }
    if head.starts_with(b"<?xml") {
        return "text/xml";
    }
    let lower = head.to_ascii_lowercase();
    if lower.starts_with(b"<!doctype html") || lower.starts_with(b"<html") {
        return "text/html";
    }
    "text/plain"
}

/// `{"` / `{}` 或 `[` 后接 JSON 值的开头；`[section]` 之类的 ini 头不算
fn looks_like_json(head: &[u8]) -> bool {
    let (open, rest) = match head.split_first() {
        Some((&b, rest)) if b == b'{' || b == b'[' => (b, rest),
        _ => return false,
    };
    let next = match rest.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(&b) => b,
        None => return false,
    };
    match open {
        b'{' => matches!(next, b'"' | b'}'),
        _ => matches!(next, b'{' | b'[' | b'"' | b']' | b'-' | b'0'..=b'9'),
    }
}

/// 判定缓冲区是否“明显是二进制”
/// - 含 NUL 字节即认为二进制；
/// - 否则可打印字符（含 tab/CR/LF 与非 ASCII 字节）占比低于 75% 视为二进制。
fn is_probably_binary(buf: &[u8]) -> bool {
    if buf.iter().any(|&b| b == 0) {
        return true;
    }
    let printable = buf
        .iter()
        .filter(|&&b| matches!(b, 0x09 | 0x0A | 0x0C | 0x0D) || (0x20..=0x7E).contains(&b) || b >= 0x80)
        .count();
    (printable as f32 / buf.len() as f32) < 0.75
}

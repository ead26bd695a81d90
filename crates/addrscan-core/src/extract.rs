//! 单文件提取：有损解码后做两段式匹配
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::detectors::DetectorSet;
use crate::findings::Hit;

/// 在文本上提取全部命中；同一地址每出现一次记一次（不去重）
pub fn extract_text(text: &str, detectors: &DetectorSet) -> Vec<Hit> {
    detectors
        .candidates(text)
        .filter_map(|candidate| {
            detectors.classify(candidate).map(|symbol| Hit {
                address: candidate.to_string(),
                symbol: symbol.to_string(),
            })
        })
        .collect()
}

/// 读取单个文件并提取
/// - 无法解码的字节替换为 U+FFFD，不中止该文件
/// - 超过 `max_file_size` 的文件按零命中处理
pub fn scan_file(path: &Path, detectors: &DetectorSet, max_file_size: Option<u64>) -> std::io::Result<Vec<Hit>> {
    let file = File::open(path)?;
    if let Some(max) = max_file_size {
        if file.metadata()?.len() > max {
            tracing::debug!(path = %path.display(), max, "file exceeds size limit, skipped");
            return Ok(Vec::new());
        }
    }
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;

    let text = String::from_utf8_lossy(&buf);
    Ok(extract_text(&text, detectors))
}

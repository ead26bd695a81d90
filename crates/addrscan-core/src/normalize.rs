//! 文件名归一化：从（可能来自 URL 的）文件名中取出扩展名

/// 返回小写扩展名；无扩展名或扩展名全为数字时返回空串
/// - 先去掉首个 '@' 或 '?' 及其后的全部内容（URL 派生文件名的残留）
/// - 再取最后一个 '.' 之后的部分
pub fn normalize_extension(file_name: &str) -> String {
    let name = match file_name.find(['@', '?']) {
        Some(i) => &file_name[..i],
        None => file_name,
    };
    let ext = match name.rfind('.') {
        Some(i) => &name[i + 1..],
        None => return String::new(),
    };
    if ext.bytes().all(|b| b.is_ascii_digit()) {
        // 包括空串
        return String::new();
    }
    ext.to_lowercase()
}

//! 配置文件加载（TOML）
use std::path::Path;

use crate::error::{Result, ScanError};
use crate::options::ScanOptions;

/// 从 TOML 文件读取扫描选项；未出现的字段取默认值
pub fn load_options(path: &Path) -> Result<ScanOptions> {
    let txt = std::fs::read_to_string(path).map_err(|source| ScanError::InputFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_options(&txt)
}

pub fn parse_options(txt: &str) -> Result<ScanOptions> {
    Ok(toml::from_str(txt)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ScanMode;
    use std::path::PathBuf;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let opts = parse_options(
            r#"
dataset_dir = "/data/sites"
mode = "batch"
threads = 4
extra_mimes = "conf/extra_mimes"
"#,
        )
        .unwrap();
        assert_eq!(opts.dataset_dir, PathBuf::from("/data/sites"));
        assert_eq!(opts.mode, ScanMode::Batch);
        assert_eq!(opts.threads, Some(4));
        assert_eq!(opts.extra_mimes, Some(PathBuf::from("conf/extra_mimes")));
        assert_eq!(opts.mime_threshold, 10);
        assert!(opts.sniff_content);
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let err = parse_options("mode = \"sideways\"").unwrap_err();
        assert!(matches!(err, ScanError::Config(_)));
    }
}

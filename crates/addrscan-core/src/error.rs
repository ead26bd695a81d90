//! 错误类型（启动期致命错误；单文件错误不经过这里）
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("dataset root does not exist: {0}")]
    RootMissing(PathBuf),

    #[error("dataset root is not a directory: {0}")]
    RootNotDirectory(PathBuf),

    #[error("cannot read input file {path}: {source}")]
    InputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: malformed rule line (expected \"<symbol> <pattern>\")")]
    MalformedRule { path: PathBuf, line: usize },

    #[error("{path}:{line}: invalid pattern: {source}")]
    Pattern {
        path: PathBuf,
        line: usize,
        #[source]
        source: regex::Error,
    },

    #[error("invalid delimiter class: {0}")]
    Delimiter(#[source] regex::Error),

    #[error("address rules file is empty: {0}")]
    EmptyRules(PathBuf),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;

//! 扫描选项与统计信息（模块）
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// 调度方式
/// - Batch：先完整遍历再启动 worker，总数从第一次进度报告起即已知。
/// - Streaming：遍历与 worker 并行，队列有界，遍历在队列满时阻塞（背压）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    Batch,
    Streaming,
}

/// 扫描选项（可由 TOML 配置文件反序列化，缺省字段取默认值）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// 数据集根目录
    pub dataset_dir: PathBuf,
    /// 线程数：None 表示自动（等于 CPU 核数）
    pub threads: Option<usize>,
    /// 进度报告间隔（秒）
    pub progress_interval_secs: u64,
    pub mode: ScanMode,
    /// Streaming 模式下的队列容量
    pub queue_capacity: usize,
    /// MIME 缓存阈值：同一 (目录, 扩展名) 连续相同判定达到该次数后不再嗅探
    pub mime_threshold: i64,
    /// 是否启用内容嗅探
    pub sniff_content: bool,
    /// 关闭嗅探时，未被扩展名规则决定的文件是否接受
    pub accept_unsniffed: bool,
    /// 地址前后的分隔字符类（正则字符类）
    pub pre_delimiters: String,
    pub post_delimiters: String,
    /// 最大文件大小（字节）；超过则按零命中处理
    pub max_file_size: Option<u64>,

    /// 地址规则文件：首行为公共模式，其余每行 "<symbol> <pattern>"
    pub address_rules: PathBuf,
    pub accepted_exts: Option<PathBuf>,
    pub refused_exts: Option<PathBuf>,
    pub ignored_dirs: Option<PathBuf>,
    /// 额外接受的 MIME 类型（除 text/* 外）
    pub extra_mimes: Option<PathBuf>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            dataset_dir: PathBuf::from("dataset"),
            threads: None,
            progress_interval_secs: 1,
            mode: ScanMode::Streaming,
            queue_capacity: 10_000,
            mime_threshold: 10,
            sniff_content: true,
            accept_unsniffed: false,
            pre_delimiters: "[^A-Za-z0-9]".to_string(),
            post_delimiters: "[^A-Za-z0-9]".to_string(),
            max_file_size: None,
            address_rules: PathBuf::from("./rules/address_rules"),
            accepted_exts: Some(PathBuf::from("./rules/accepted_exts")),
            refused_exts: Some(PathBuf::from("./rules/refused_exts")),
            ignored_dirs: Some(PathBuf::from("./rules/ignored_dirs")),
            extra_mimes: Some(PathBuf::from("./rules/extra_mimes")),
        }
    }
}

impl ScanOptions {
    pub fn worker_count(&self) -> usize {
        self.threads.filter(|&n| n >= 1).unwrap_or_else(num_cpus::get).max(1)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_secs(self.progress_interval_secs.max(1))
    }

    pub fn mime_threshold(&self) -> i64 {
        self.mime_threshold.max(1)
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity.max(1)
    }
}

/// 扫描统计信息（便于 CLI 打印）
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanStats {
    pub files_prepared: u64,
    pub files_processed: u64,
    /// 地址出现总次数
    pub matches: u64,
    /// 不同地址个数
    pub addresses: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_values() {
        let opts = ScanOptions {
            threads: Some(0),
            progress_interval_secs: 0,
            queue_capacity: 0,
            mime_threshold: -3,
            ..Default::default()
        };
        assert!(opts.worker_count() >= 1);
        assert_eq!(opts.progress_interval(), Duration::from_secs(1));
        assert_eq!(opts.queue_capacity(), 1);
        assert_eq!(opts.mime_threshold(), 1);
    }

    #[test]
    fn test_explicit_threads() {
        let opts = ScanOptions { threads: Some(3), ..Default::default() };
        assert_eq!(opts.worker_count(), 3);
    }
}

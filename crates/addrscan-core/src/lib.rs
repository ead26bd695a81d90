//! 加密货币地址提取核心库
//!
//! 设计要点：
//! - 遍历数据集目录，先按文件名（忽略目录/扩展名集合）廉价筛选，必要时再做内容嗅探，嗅探结论按 (目录, 扩展名) 缓存。
//! - 候选文件经工作队列分发给固定数量的 worker 线程；Streaming 模式下队列有界，遍历受背压约束。
//! - 内容有损解码后做两段式匹配：外层公共模式（带前后分隔符）找候选，内层有序规则按“首条命中”确定币种。
//! - 命中按地址聚合（币种、出现次数、站点 → 文件列表），队列 join 后一次性输出 JSON。

mod aggregate;
mod classify;
mod config;
mod detectors;
mod error;
mod extract;
mod findings;
mod mime_cache;
mod normalize;
mod options;
mod progress;
mod queue;
mod report;
mod rules;
mod scan;
mod sniff;
mod walker;

pub use aggregate::{Aggregator, UNKNOWN_SITE};
pub use classify::{Classifier, SniffPolicy};
pub use config::{load_options, parse_options};
pub use detectors::{Candidates, CryptoRule, DetectorSet};
pub use error::{Result, ScanError};
pub use extract::{extract_text, scan_file};
pub use findings::Hit;
pub use mime_cache::MimeCache;
pub use normalize::normalize_extension;
pub use options::{ScanMode, ScanOptions, ScanStats};
pub use progress::{scale_count, Counters, ProgressMonitor, Snapshot};
pub use queue::WorkQueue;
pub use report::{write_report, FoundRecord, Report};
pub use rules::{
    load_address_rules, load_ext_set, load_name_set, parse_address_rules, parse_ext_set, parse_name_set, AddressRules,
    RuleSpec,
};
pub use scan::{run_scan, scan_and_write, ScanInputs, ScanOutcome};
pub use sniff::{mime_from_bytes, sniff_mime};
pub use walker::{ensure_root, walk};

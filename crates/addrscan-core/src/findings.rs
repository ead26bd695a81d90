//! 命中项（内部使用）

/// 单次命中：一次地址出现
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub address: String,
    pub symbol: String,
}

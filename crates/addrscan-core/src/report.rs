//! 报告结构与 JSON 输出
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;

use crate::error::Result;

/// 单个地址的聚合记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoundRecord {
    /// 首次出现时确定，之后不再改变
    pub symbol: String,
    /// 出现总次数（跨所有文件，同一文件内多次出现分别计数）
    pub count: u64,
    /// 站点名 → 出现过该地址的文件（每个站点内去重）
    pub sites: BTreeMap<String, Vec<String>>,
}

/// 输出文档：`{"addresses": {...}}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub addresses: BTreeMap<String, FoundRecord>,
}

impl Report {
    /// 全部地址的出现总次数
    pub fn total_count(&self) -> u64 {
        self.addresses.values().map(|r| r.count).sum()
    }
}

/// 带缩进写出报告（结尾换行）
pub fn write_report(report: &Report, out: &mut dyn Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

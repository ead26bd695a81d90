//! 聚合：地址 → 记录，单锁保护整张表
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::report::{FoundRecord, Report};

/// 根目录下没有子目录的文件所属的站点名
pub const UNKNOWN_SITE: &str = "unknown";

/// 聚合期间的记录；站点内文件用有序集合去重，输出时转为列表
struct Entry {
    symbol: String,
    count: u64,
    sites: BTreeMap<String, BTreeSet<String>>,
}

pub struct Aggregator {
    root: PathBuf,
    found: Mutex<BTreeMap<String, Entry>>,
}

impl Aggregator {
    pub fn new(root: &Path) -> Self {
        Self { root: root.to_path_buf(), found: Mutex::new(BTreeMap::new()) }
    }

    /// 去掉数据集根前缀后取第一级目录名；根目录下的散落文件记为 "unknown"
    pub fn site_of(&self, path: &Path) -> String {
        let rel = match path.strip_prefix(&self.root) {
            Ok(r) => r,
            Err(_) => return UNKNOWN_SITE.to_string(),
        };
        let mut parts = rel.components().filter_map(|c| match c {
            Component::Normal(s) => Some(s),
            _ => None,
        });
        match (parts.next(), parts.next()) {
            (Some(site), Some(_)) => site.to_string_lossy().into_owned(),
            _ => UNKNOWN_SITE.to_string(),
        }
    }

    /// 记录一次出现
    /// - 新地址：建立记录，count = 1
    /// - 已有地址：count 无条件 +1；symbol 保持首次值；文件在该站点下去重
    pub fn record(&self, address: &str, symbol: &str, site: &str, file: &str) {
        let mut found = self.lock();
        let rec = found.entry(address.to_string()).or_insert_with(|| Entry {
            symbol: symbol.to_string(),
            count: 0,
            sites: BTreeMap::new(),
        });
        rec.count += 1;
        match rec.sites.get_mut(site) {
            Some(files) => {
                if !files.contains(file) {
                    files.insert(file.to_string());
                }
            }
            None => {
                rec.sites.insert(site.to_string(), BTreeSet::from([file.to_string()]));
            }
        }
    }

    /// 取出最终结果（队列 join 之后调用）；每个站点的文件按路径排序
    pub fn into_report(self) -> Report {
        let found = self.found.into_inner().unwrap_or_else(|e| e.into_inner());
        let addresses = found
            .into_iter()
            .map(|(address, e)| {
                let sites = e.sites.into_iter().map(|(site, files)| (site, files.into_iter().collect())).collect();
                (address, FoundRecord { symbol: e.symbol, count: e.count, sites })
            })
            .collect();
        Report { addresses }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Entry>> {
        self.found.lock().unwrap_or_else(|e| e.into_inner())
    }
}

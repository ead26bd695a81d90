//! MIME 判定缓存：按 (目录, 扩展名) 记忆连续的嗅探结论
//!
//! 计数器为有符号整数：正数表示连续“文本”判定次数，负数表示连续“非文本”判定次数。
//! 与当前符号相反的判定会先把计数器清零再累加，因此绝对值总是“连续”次数。
//! 绝对值达到阈值后，该键不再嗅探，直接复用结论。

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub struct MimeCache {
    threshold: i64,
    counters: Mutex<HashMap<(PathBuf, String), i64>>,
}

impl MimeCache {
    /// threshold 至少为 1；1 即“信任最近一次嗅探”
    pub fn new(threshold: i64) -> Self {
        Self { threshold: threshold.max(1), counters: Mutex::new(HashMap::new()) }
    }

    /// 返回是否接受。`sniff` 仅在缓存未定论时调用；返回 None 表示嗅探失败（拒绝，且不更新计数）。
    pub fn classify(&self, dir: &Path, ext: &str, sniff: impl FnOnce() -> Option<bool>) -> bool {
        let key = (dir.to_path_buf(), ext.to_string());
        {
            let mut counters = self.lock();
            let counter = *counters.entry(key.clone()).or_insert(0);
            if counter >= self.threshold {
                return true;
            }
            if counter <= -self.threshold {
                return false;
            }
        }

        // 嗅探不持锁
        let verdict = match sniff() {
            Some(v) => v,
            None => return false,
        };

        let mut counters = self.lock();
        let counter = counters.entry(key).or_insert(0);
        if verdict {
            if *counter < 0 {
                *counter = 0;
            }
            *counter += 1;
        } else {
            if *counter > 0 {
                *counter = 0;
            }
            *counter -= 1;
        }
        verdict
    }

    /// 当前计数（未出现的键为 0）
    pub fn counter(&self, dir: &Path, ext: &str) -> i64 {
        self.lock().get(&(dir.to_path_buf(), ext.to_string())).copied().unwrap_or(0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(PathBuf, String), i64>> {
        // 计数器总是处于一致状态，中毒后继续使用
        self.counters.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_sniffs_until_threshold() {
        let cache = MimeCache::new(3);
        let dir = Path::new("/d");
        let sniffs = Cell::new(0);
        let sniff = || {
            sniffs.set(sniffs.get() + 1);
            Some(true)
        };
        for _ in 0..5 {
            assert!(cache.classify(dir, "", sniff));
        }
        assert_eq!(sniffs.get(), 3);
        assert_eq!(cache.counter(dir, ""), 3);
    }

    #[test]
    fn test_opposite_verdict_resets_counter() {
        let cache = MimeCache::new(5);
        let dir = Path::new("/d");
        cache.classify(dir, "x", || Some(true));
        cache.classify(dir, "x", || Some(true));
        assert_eq!(cache.counter(dir, "x"), 2);
        assert!(!cache.classify(dir, "x", || Some(false)));
        assert_eq!(cache.counter(dir, "x"), -1);
        assert!(cache.classify(dir, "x", || Some(true)));
        assert_eq!(cache.counter(dir, "x"), 1);
    }

    #[test]
    fn test_negative_verdict_cached() {
        let cache = MimeCache::new(2);
        let dir = Path::new("/bin");
        assert!(!cache.classify(dir, "7", || Some(false)));
        assert!(!cache.classify(dir, "7", || Some(false)));
        assert!(!cache.classify(dir, "7", || panic!("must not sniff")));
    }

    #[test]
    fn test_keys_are_independent() {
        let cache = MimeCache::new(1);
        cache.classify(Path::new("/a"), "dat", || Some(true));
        assert!(!cache.classify(Path::new("/b"), "dat", || Some(false)));
        assert!(cache.classify(Path::new("/a"), "dat", || panic!("cached")));
        assert_eq!(cache.counter(Path::new("/a"), "bin"), 0);
    }

    #[test]
    fn test_failed_sniff_leaves_counter() {
        let cache = MimeCache::new(2);
        let dir = Path::new("/d");
        cache.classify(dir, "", || Some(true));
        assert!(!cache.classify(dir, "", || None));
        assert_eq!(cache.counter(dir, ""), 1);
    }

    #[test]
    fn test_counter_reflects_consecutive_run() {
        let cache = MimeCache::new(4);
        let dir = Path::new("/d");
        let verdicts = [true, false, false, true, true, true, false];
        for v in verdicts {
            cache.classify(dir, "e", || Some(v));
        }
        assert_eq!(cache.counter(dir, "e"), -1);
    }
}

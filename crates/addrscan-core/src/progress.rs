//! 进度计数与后台报告
//!
//! 已处理/已命中按 worker 分片，各 worker 只写自己的槽位，读取时求和。
//! 周期报告按数量级缩写，结束时输出一行精确值。

use crossbeam_channel::{self as channel, RecvTimeoutError, Sender};
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{Scope, ScopedJoinHandle};
use std::time::Duration;

#[derive(Default)]
#[repr(align(64))]
struct WorkerSlot {
    processed: AtomicU64,
    matched: AtomicU64,
}

pub struct Counters {
    prepared: AtomicU64,
    slots: Box<[WorkerSlot]>,
}

/// 某一时刻的计数快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub prepared: u64,
    pub processed: u64,
    pub matched: u64,
}

impl Counters {
    pub fn new(workers: usize) -> Self {
        let slots = (0..workers.max(1)).map(|_| WorkerSlot::default()).collect();
        Self { prepared: AtomicU64::new(0), slots }
    }

    pub fn add_prepared(&self) {
        self.prepared.fetch_add(1, Ordering::Relaxed);
    }

    /// worker 处理完一个文件：processed +1，matched +hits
    pub fn add_processed(&self, worker: usize, hits: u64) {
        let slot = &self.slots[worker % self.slots.len()];
        slot.matched.fetch_add(hits, Ordering::Relaxed);
        slot.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> Snapshot {
        let (processed, matched) = self.slots.iter().fold((0, 0), |(p, m), s| {
            (p + s.processed.load(Ordering::Relaxed), m + s.matched.load(Ordering::Relaxed))
        });
        Snapshot { prepared: self.prepared.load(Ordering::Relaxed), processed, matched }
    }
}

/// 按数量级缩写：< 10 000 原样，< 10 000 000 以 k 计，否则以 M 计
pub fn scale_count(n: u64) -> String {
    if n < 10_000 {
        n.to_string()
    } else if n < 10_000_000 {
        format!("{}k", n / 1_000)
    } else {
        format!("{}M", n / 1_000_000)
    }
}

/// 周期报告行：matched <== processed / prepared
pub fn progress_line(s: &Snapshot) -> String {
    format!("{} <== {} / {}", scale_count(s.matched), scale_count(s.processed), scale_count(s.prepared))
}

/// 结束时的精确汇总行
pub fn summary_line(s: &Snapshot) -> String {
    format!("{} <== {} / {} (matched <== processed / prepared)", s.matched, s.processed, s.prepared)
}

/// 后台进度报告线程；`finish` 发送停止信号、等待线程退出并输出精确汇总
pub struct ProgressMonitor<'scope> {
    stop: Sender<()>,
    handle: ScopedJoinHandle<'scope, ()>,
}

impl<'scope> ProgressMonitor<'scope> {
    pub fn spawn(
        scope: &'scope Scope<'scope, '_>,
        counters: &'scope Counters,
        interval: Duration,
        mut out: Box<dyn Write + Send + 'scope>,
    ) -> std::io::Result<Self> {
        let (stop, stop_rx) = channel::bounded::<()>(1);
        let handle = std::thread::Builder::new()
            .name("addrscan-progress".to_string())
            .spawn_scoped(scope, move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            let _ = writeln!(out, "{}", progress_line(&counters.snapshot()));
                            let _ = out.flush();
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                let _ = writeln!(out, "{}", summary_line(&counters.snapshot()));
                let _ = out.flush();
            })?;
        Ok(Self { stop, handle })
    }

    pub fn finish(self) {
        let _ = self.stop.send(());
        if self.handle.join().is_err() {
            tracing::warn!("progress monitor panicked");
        }
    }
}

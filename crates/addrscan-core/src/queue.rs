//! 线程安全的工作队列（FIFO + 完成计数）
//!
//! 每个 `get` 出的条目处理完后必须恰好调用一次 `mark_done`；
//! `join` 阻塞到所有 `put` 的条目都被标记完成为止。

use crossbeam_channel::{self as channel, Receiver, Sender};
use std::sync::{Condvar, Mutex, MutexGuard};

pub struct WorkQueue<T> {
    tx: Mutex<Option<Sender<T>>>,
    rx: Receiver<T>,
    pending: Mutex<usize>,
    drained: Condvar,
}

impl<T> WorkQueue<T> {
    pub fn unbounded() -> Self {
        Self::from_channel(channel::unbounded())
    }

    /// 有界队列：满时 `put` 阻塞（背压）
    pub fn bounded(capacity: usize) -> Self {
        Self::from_channel(channel::bounded(capacity.max(1)))
    }

    fn from_channel((tx, rx): (Sender<T>, Receiver<T>)) -> Self {
        Self { tx: Mutex::new(Some(tx)), rx, pending: Mutex::new(0), drained: Condvar::new() }
    }

    /// 入队；队列已关闭时把条目原样退回
    pub fn put(&self, item: T) -> Result<(), T> {
        // 发送端克隆后立即释放锁，阻塞发送不影响 close
        let tx = match lock(&self.tx).as_ref() {
            Some(tx) => tx.clone(),
            None => return Err(item),
        };
        // 先计数再发送，保证 join 不会在条目可见之前返回
        *lock(&self.pending) += 1;
        match tx.send(item) {
            Ok(()) => Ok(()),
            Err(channel::SendError(item)) => {
                self.mark_done();
                Err(item)
            }
        }
    }

    /// 出队；队列为空时阻塞。队列关闭且已取空时返回 None
    pub fn get(&self) -> Option<T> {
        self.rx.recv().ok()
    }

    pub fn mark_done(&self) {
        let mut pending = lock(&self.pending);
        *pending = pending.saturating_sub(1);
        if *pending == 0 {
            self.drained.notify_all();
        }
    }

    /// 阻塞直到每个已入队条目都有对应的 `mark_done`
    pub fn join(&self) {
        let mut pending = lock(&self.pending);
        while *pending > 0 {
            pending = self.drained.wait(pending).unwrap_or_else(|e| e.into_inner());
        }
    }

    /// 关闭入口；剩余条目仍可被取出，取空后 `get` 返回 None
    pub fn close(&self) {
        lock(&self.tx).take();
    }

    /// 尚未完成的条目数
    pub fn pending(&self) -> usize {
        *lock(&self.pending)
    }
}

fn lock<G>(m: &Mutex<G>) -> MutexGuard<'_, G> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// 在 drop 时调用 `mark_done`，确保出错（甚至 panic）的条目也不会让 join 卡住
pub(crate) struct DoneGuard<'a, T>(pub(crate) &'a WorkQueue<T>);

impl<T> Drop for DoneGuard<'_, T> {
    fn drop(&mut self) {
        self.0.mark_done();
    }
}

//! 扫描主流程与并行调度
//!
//! 数据流：Walker → WorkQueue → worker 线程池 → Aggregator → 报告；
//! 进度线程异步观察计数。队列 join 返回后聚合结果完整可见。
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread::{Scope, ScopedJoinHandle};

use tracing::{debug, info, warn};

use crate::aggregate::Aggregator;
use crate::classify::{Classifier, SniffPolicy};
use crate::detectors::DetectorSet;
use crate::error::Result;
use crate::extract::scan_file;
use crate::mime_cache::MimeCache;
use crate::options::{ScanMode, ScanOptions, ScanStats};
use crate::progress::{Counters, ProgressMonitor};
use crate::queue::{DoneGuard, WorkQueue};
use crate::report::{write_report, Report};
use crate::rules::{load_address_rules, load_ext_set, load_name_set, load_optional_set, AddressRules};
use crate::walker::{ensure_root, walk};

/// 启动前一次性加载、之后只读的输入
#[derive(Debug, Clone)]
pub struct ScanInputs {
    pub rules: AddressRules,
    pub ignored_dirs: HashSet<String>,
    pub accepted_exts: HashSet<String>,
    pub refused_exts: HashSet<String>,
    pub extra_mimes: HashSet<String>,
}

impl ScanInputs {
    /// 按选项中的路径读取全部输入文件；任何一个读不到都是致命错误
    pub fn load(opts: &ScanOptions) -> Result<Self> {
        Ok(Self {
            rules: load_address_rules(&opts.address_rules)?,
            ignored_dirs: load_optional_set(opts.ignored_dirs.as_deref(), load_name_set)?,
            accepted_exts: load_optional_set(opts.accepted_exts.as_deref(), load_ext_set)?,
            refused_exts: load_optional_set(opts.refused_exts.as_deref(), load_ext_set)?,
            extra_mimes: load_optional_set(opts.extra_mimes.as_deref(), load_name_set)?,
        })
    }
}

/// 扫描结果
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub report: Report,
    pub stats: ScanStats,
}

/// worker 共享的只读上下文
struct WorkerContext<'a> {
    queue: &'a WorkQueue<PathBuf>,
    detectors: &'a DetectorSet,
    aggregator: &'a Aggregator,
    counters: &'a Counters,
    max_file_size: Option<u64>,
}

/// 加载输入、执行扫描并把 JSON 报告写入 `out`；进度行写入 `progress`
pub fn scan_and_write(
    opts: &ScanOptions,
    out: &mut dyn Write,
    progress: Box<dyn Write + Send + '_>,
) -> Result<ScanStats> {
    ensure_root(&opts.dataset_dir)?;
    let inputs = ScanInputs::load(opts)?;
    let outcome = run_scan(opts, inputs, progress)?;
    write_report(&outcome.report, out)?;
    Ok(outcome.stats)
}

/// 执行完整扫描；`progress_out` 接收周期进度行与最终汇总行
pub fn run_scan(opts: &ScanOptions, inputs: ScanInputs, progress_out: Box<dyn Write + Send + '_>) -> Result<ScanOutcome> {
    let root = opts.dataset_dir.as_path();
    ensure_root(root)?;

    let detectors = DetectorSet::from_rules(&inputs.rules, &opts.pre_delimiters, &opts.post_delimiters)?;
    let policy = if opts.sniff_content {
        SniffPolicy::Sniff(MimeCache::new(opts.mime_threshold()))
    } else {
        SniffPolicy::Fixed(opts.accept_unsniffed)
    };
    let classifier = Classifier::new(
        root,
        inputs.ignored_dirs,
        inputs.accepted_exts,
        inputs.refused_exts,
        inputs.extra_mimes,
        policy,
    );

    let workers = opts.worker_count();
    let counters = Counters::new(workers);
    let aggregator = Aggregator::new(root);
    let queue = match opts.mode {
        ScanMode::Batch => WorkQueue::unbounded(),
        ScanMode::Streaming => WorkQueue::bounded(opts.queue_capacity()),
    };
    info!(root = %root.display(), workers, mode = ?opts.mode, rules = detectors.rules().len(), "starting scan");

    let ctx = WorkerContext {
        queue: &queue,
        detectors: &detectors,
        aggregator: &aggregator,
        counters: &counters,
        max_file_size: opts.max_file_size,
    };

    std::thread::scope(|s| -> Result<()> {
        let monitor = ProgressMonitor::spawn(s, &counters, opts.progress_interval(), progress_out)?;

        // Batch：先完整遍历，再启动 worker
        if opts.mode == ScanMode::Batch {
            feed(root, &classifier, &queue, &counters);
        }
        let handles = match spawn_workers(s, workers, &ctx) {
            Ok(h) => h,
            Err(err) => {
                queue.close();
                monitor.finish();
                return Err(err.into());
            }
        };
        if opts.mode == ScanMode::Streaming {
            feed(root, &classifier, &queue, &counters);
        }

        queue.join();
        queue.close();
        for h in handles {
            if h.join().is_err() {
                warn!("worker thread panicked");
            }
        }
        monitor.finish();
        Ok(())
    })?;

    let snap = counters.snapshot();
    let report = aggregator.into_report();
    let stats = ScanStats {
        files_prepared: snap.prepared,
        files_processed: snap.processed,
        matches: snap.matched,
        addresses: report.addresses.len(),
    };
    info!(
        files_prepared = stats.files_prepared,
        files_processed = stats.files_processed,
        matches = stats.matches,
        addresses = stats.addresses,
        "scan finished"
    );
    Ok(ScanOutcome { report, stats })
}

/// 遍历并入队；Streaming 模式下队列满时在此阻塞
fn feed(root: &Path, classifier: &Classifier, queue: &WorkQueue<PathBuf>, counters: &Counters) {
    for path in walk(root, classifier) {
        counters.add_prepared();
        if queue.put(path).is_err() {
            break;
        }
    }
}

fn spawn_workers<'scope, 'ctx>(
    s: &'scope Scope<'scope, '_>,
    workers: usize,
    ctx: &'scope WorkerContext<'ctx>,
) -> std::io::Result<Vec<ScopedJoinHandle<'scope, ()>>> {
    let mut handles = Vec::with_capacity(workers);
    for id in 0..workers {
        let h = std::thread::Builder::new()
            .name(format!("addrscan-worker-{id}"))
            .spawn_scoped(s, move || worker_loop(id, ctx))?;
        handles.push(h);
    }
    Ok(handles)
}

/// worker 主循环：取路径 → 提取 → 聚合 → 计数 → mark_done
/// 单文件错误只记日志并按零命中处理，不向外传播
fn worker_loop(id: usize, ctx: &WorkerContext<'_>) {
    while let Some(path) = ctx.queue.get() {
        let _done = DoneGuard(ctx.queue);
        let hits = match scan_file(&path, ctx.detectors, ctx.max_file_size) {
            Ok(hits) => hits,
            Err(err) => {
                debug!(path = %path.display(), %err, "cannot read file");
                Vec::new()
            }
        };
        if !hits.is_empty() {
            let site = ctx.aggregator.site_of(&path);
            let file = path.display().to_string();
            for hit in &hits {
                ctx.aggregator.record(&hit.address, &hit.symbol, &site, &file);
            }
            debug!(path = %path.display(), site = %site, hits = hits.len(), "matched");
        }
        ctx.counters.add_processed(id, hits.len() as u64);
    }
}

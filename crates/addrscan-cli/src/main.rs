use addrscan_core::{ensure_root, load_options, run_scan, write_report, ScanInputs, ScanMode, ScanOptions};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "addrscan", version, about = "Extract cryptocurrency addresses from a crawled dataset")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 扫描数据集目录并生成地址报告（JSON）
    Scan(ScanArgs),
}

/// 命令行参数；未给出的项取配置文件（--config）中的值，再取默认值
#[derive(clap::Args, Debug)]
struct ScanArgs {
    /// TOML 配置文件
    #[arg(long, env = "ADDRSCAN_CONFIG")]
    config: Option<PathBuf>,

    /// 数据集根目录
    #[arg(long, env = "ADDRSCAN_INPUT")]
    input: Option<PathBuf>,

    /// 输出文件（JSON）
    #[arg(long, env = "ADDRSCAN_OUTPUT", default_value = "./addresses.json")]
    output: PathBuf,

    /// 线程数（"auto"=CPU 核心数）
    #[arg(long, env = "ADDRSCAN_THREADS")]
    threads: Option<String>,

    /// 调度方式：batch（先遍历后处理）或 streaming（边遍历边处理）
    #[arg(long, env = "ADDRSCAN_MODE", value_parser = ["batch", "streaming"])]
    mode: Option<String>,

    /// streaming 模式的队列容量
    #[arg(long, env = "ADDRSCAN_QUEUE_CAPACITY")]
    queue_capacity: Option<usize>,

    /// 进度报告间隔（秒）
    #[arg(long, env = "ADDRSCAN_INTERVAL")]
    interval: Option<u64>,

    /// MIME 缓存阈值
    #[arg(long, env = "ADDRSCAN_MIME_THRESHOLD")]
    mime_threshold: Option<i64>,

    /// 关闭内容嗅探
    #[arg(long, env = "ADDRSCAN_NO_SNIFF")]
    no_sniff: bool,

    /// 关闭嗅探时接受未被扩展名规则决定的文件
    #[arg(long, env = "ADDRSCAN_ACCEPT_UNSNIFFED")]
    accept_unsniffed: bool,

    /// 地址前的分隔字符类（正则）
    #[arg(long, env = "ADDRSCAN_PRE")]
    pre: Option<String>,

    /// 地址后的分隔字符类（正则）
    #[arg(long, env = "ADDRSCAN_POST")]
    post: Option<String>,

    /// 最大扫描文件大小（单位字节）
    #[arg(long, env = "ADDRSCAN_MAX_FILE_SIZE")]
    max_file_size: Option<u64>,

    /// 地址规则文件
    #[arg(long, env = "ADDRSCAN_RULES")]
    rules: Option<PathBuf>,

    #[arg(long, env = "ADDRSCAN_ACCEPTED_EXTS")]
    accepted_exts: Option<PathBuf>,

    #[arg(long, env = "ADDRSCAN_REFUSED_EXTS")]
    refused_exts: Option<PathBuf>,

    #[arg(long, env = "ADDRSCAN_IGNORED_DIRS")]
    ignored_dirs: Option<PathBuf>,

    #[arg(long, env = "ADDRSCAN_EXTRA_MIMES")]
    extra_mimes: Option<PathBuf>,
}

fn main() -> Result<()> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => {
            let output = args.output.clone();
            let opts = resolve_options(args)?;
            info!(input = ?opts.dataset_dir, ?output, "starting scan");

            // 根目录检查先于一切工作
            ensure_root(&opts.dataset_dir)?;
            let inputs = ScanInputs::load(&opts).context("load input files")?;

            let outcome = run_scan(&opts, inputs, Box::new(std::io::stdout())).context("scan failed")?;

            let mut out = BufWriter::new(File::create(&output).context("create output file")?);
            write_report(&outcome.report, &mut out).context("write report")?;
            out.flush().context("flush report")?;

            info!(
                files_processed = outcome.stats.files_processed,
                addresses = outcome.stats.addresses,
                occurrences = outcome.report.total_count(),
                "report written"
            );
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 日志写到 stderr，stdout 留给进度输出
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 合并配置文件与命令行参数
fn resolve_options(args: ScanArgs) -> Result<ScanOptions> {
    let mut opts = match &args.config {
        Some(path) => load_options(path).with_context(|| format!("load config {}", path.display()))?,
        None => ScanOptions::default(),
    };

    if let Some(input) = args.input {
        opts.dataset_dir = input;
    }
    if let Some(threads) = args.threads.as_deref() {
        opts.threads = parse_threads(threads);
    }
    if let Some(mode) = args.mode.as_deref() {
        opts.mode = match mode {
            "batch" => ScanMode::Batch,
            _ => ScanMode::Streaming,
        };
    }
    if let Some(n) = args.queue_capacity {
        opts.queue_capacity = n;
    }
    if let Some(secs) = args.interval {
        opts.progress_interval_secs = secs;
    }
    if let Some(t) = args.mime_threshold {
        opts.mime_threshold = t;
    }
    if args.no_sniff {
        opts.sniff_content = false;
    }
    if args.accept_unsniffed {
        opts.accept_unsniffed = true;
    }
    if let Some(pre) = args.pre {
        opts.pre_delimiters = pre;
    }
    if let Some(post) = args.post {
        opts.post_delimiters = post;
    }
    if args.max_file_size.is_some() {
        opts.max_file_size = args.max_file_size;
    }
    if let Some(rules) = args.rules {
        opts.address_rules = rules;
    }
    if args.accepted_exts.is_some() {
        opts.accepted_exts = args.accepted_exts;
    }
    if args.refused_exts.is_some() {
        opts.refused_exts = args.refused_exts;
    }
    if args.ignored_dirs.is_some() {
        opts.ignored_dirs = args.ignored_dirs;
    }
    if args.extra_mimes.is_some() {
        opts.extra_mimes = args.extra_mimes;
    }
    Ok(opts)
}

/// 解析线程参数
fn parse_threads(s: &str) -> Option<usize> {
    if s.eq_ignore_ascii_case("auto") { return None; }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_threads() {
        assert_eq!(parse_threads("auto"), None);
        assert_eq!(parse_threads("AUTO"), None);
        assert_eq!(parse_threads("8"), Some(8));
        assert_eq!(parse_threads("0"), None);
        assert_eq!(parse_threads("many"), None);
    }

    #[test]
    fn test_cli_overrides_defaults() {
        let cli = Cli::parse_from([
            "addrscan", "scan", "--input", "/data", "--mode", "batch", "--threads", "2", "--no-sniff",
        ]);
        let Commands::Scan(args) = cli.command;
        let opts = resolve_options(args).unwrap();
        assert_eq!(opts.dataset_dir, PathBuf::from("/data"));
        assert_eq!(opts.mode, ScanMode::Batch);
        assert_eq!(opts.threads, Some(2));
        assert!(!opts.sniff_content);
        assert_eq!(opts.mime_threshold, ScanOptions::default().mime_threshold);
    }
}

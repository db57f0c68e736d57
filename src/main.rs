use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use mobile_wheels::exclusion::{partition, Partition};
use mobile_wheels::report::{render_json, render_summary, render_table, Summary};
use mobile_wheels::{BatchExecutor, CheckerConfig, ClosureWalker, LogProgress, ProgressObserver};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Json,
}

/// Check Python packages for Android and iOS wheel support.
#[derive(Parser, Debug)]
#[command(name = "mobile-wheels", version)]
struct Cli {
    /// Package names to check
    packages: Vec<String>,

    /// File with one package name per line (`#` starts a comment)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// JSON config file
    #[arg(short, long, env = "MOBILE_WHEELS_CONFIG")]
    config: Option<PathBuf>,

    /// Packages resolved at the same time
    #[arg(long)]
    concurrency: Option<usize>,

    /// Dependency levels to walk (1 = named packages only)
    #[arg(long)]
    depth: Option<u32>,

    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Debug logging and log-based progress (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

struct BarProgress(ProgressBar);

impl BarProgress {
    fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} {elapsed}") {
            bar.set_style(style);
        }
        Self(bar)
    }
}

impl ProgressObserver for BarProgress {
    fn on_progress(&self, completed: usize, total: usize) {
        self.0.set_position(completed as u64);
        if completed == total {
            self.0.finish_and_clear();
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read package list {}", path.display()))?;
    Ok(content
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => CheckerConfig::load(path)?,
        None => CheckerConfig::default(),
    };
    if let Some(concurrency) = cli.concurrency {
        config = config.with_concurrency(concurrency);
    }
    if let Some(depth) = cli.depth {
        config = config.with_depth(depth);
    }
    config.validate()?;

    let mut names = cli.packages.clone();
    if let Some(path) = &cli.input {
        names.extend(read_input(path)?);
    }
    if names.is_empty() {
        bail!("No packages given; pass names or --input <FILE>");
    }

    let Partition { eligible, excluded } = partition(&names);
    for (name, reason) in &excluded {
        eprintln!("skipping {}: {}", name, reason);
    }

    let resolver = Arc::new(config.build_resolver()?);
    info!(
        eligible = eligible.len(),
        excluded = excluded.len(),
        depth = config.depth,
        sources = ?resolver.sources().collect::<Vec<_>>(),
        "Checking packages"
    );

    let observer: Arc<dyn ProgressObserver> = if cli.verbose {
        Arc::new(LogProgress::new(10))
    } else {
        Arc::new(BarProgress::new(eligible.len()))
    };
    let executor = BatchExecutor::new(config.concurrency).with_observer(observer);

    let records = if config.depth > 1 {
        let walker = Arc::new(ClosureWalker::new(resolver, config.depth));
        executor.resolve_closures(walker, eligible).await
    } else {
        executor.resolve_all(resolver, eligible).await
    };

    match cli.format {
        Format::Table => {
            print!("{}", render_table(&records));
            println!();
            print!("{}", render_summary(&Summary::from_records(&records)));
        }
        Format::Json => println!("{}", render_json(&records)?),
    }
    Ok(())
}

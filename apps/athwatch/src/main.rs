mod infra;
mod obs;

use athwatch_application::config;
use athwatch_application::scan::{run_scan, ScanPlan};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "athwatch")]
#[command(about = "Scan a symbol list once and alert on prices near their all-time high.", version)]
#[command(
    after_help = "Examples:\n  athwatch --config platform/ops/configs/nifty50.toml\n  athwatch --config platform/ops/configs/nifty50.toml --dry-run --symbols INFY.NS,TCS.NS\n"
)]
struct Cli {
    /// Config file path (TOML).
    #[arg(long, env = "ATHWATCH_CONFIG")]
    config: PathBuf,

    /// Log notifications instead of sending them to Telegram.
    #[arg(long)]
    dry_run: bool,

    /// Comma-separated symbols to scan instead of run.symbols.
    #[arg(long, value_delimiter = ',')]
    symbols: Option<Vec<String>>,

    /// Default log filter when ATHWATCH_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log output format: text | json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Write Prometheus metrics to this file after the scan (requires feature `prometheus`).
    #[arg(long, env = "ATHWATCH_METRICS_TEXTFILE")]
    metrics_textfile: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = obs::init_tracing(&cli.log_level, &cli.log_format) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let metrics = obs::init_metrics(cli.metrics_textfile.as_deref())?;
    let (mut config, source) = config::load_config_with_source(&cli.config)?;
    if let Some(symbols) = cli.symbols {
        config.run.symbols = symbols
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        config.validate()?;
    }

    let deps = infra::build_scan_deps(&config, cli.dry_run)?;
    let plan = ScanPlan::from_config(&config);

    tracing::info!(
        config = %cli.config.display(),
        config_sha256 = %config::config_fingerprint(&source),
        symbols = plan.symbols.len(),
        dry_run = cli.dry_run,
        log_path = %config.log.path,
        "starting ATH scan"
    );

    // Per-symbol failures are already logged and counted; they never change the exit code.
    let summary = run_scan(
        &plan,
        deps.fetcher.as_ref(),
        deps.notifier.as_ref(),
        deps.audit_log.as_ref(),
    );

    tracing::info!(
        processed = summary.processed,
        alerted = summary.alerted.len(),
        log_path = %config.log.path,
        "all symbols processed"
    );

    if let Some(metrics) = metrics {
        match metrics.write() {
            Ok(()) => tracing::info!(path = %metrics.path().display(), "metrics written"),
            Err(err) => tracing::warn!(error = %err, "failed to write metrics"),
        }
    }
    Ok(())
}

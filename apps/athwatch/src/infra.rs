use athwatch_application::config::{resolve_telegram_credentials, Config, SourceKind};
use athwatch_domain::repositories::audit_log::AuditLog;
use athwatch_domain::repositories::market_data::SeriesFetcher;
use athwatch_domain::repositories::notifier::Notifier;
use athwatch_infrastructure::audit::CsvAuditLog;
use athwatch_infrastructure::market_data::csv_dir::CsvDirFetcher;
use athwatch_infrastructure::market_data::yahoo::YahooChartFetcher;
use athwatch_infrastructure::notify::log_only::LogOnlyNotifier;
use athwatch_infrastructure::notify::telegram::TelegramNotifier;

pub struct ScanDeps {
    pub fetcher: Box<dyn SeriesFetcher>,
    pub notifier: Box<dyn Notifier>,
    pub audit_log: Box<dyn AuditLog>,
}

pub fn build_scan_deps(config: &Config, dry_run: bool) -> Result<ScanDeps, String> {
    Ok(ScanDeps {
        fetcher: build_fetcher(config)?,
        notifier: build_notifier(config, dry_run)?,
        audit_log: build_audit_log(config),
    })
}

fn build_fetcher(config: &Config) -> Result<Box<dyn SeriesFetcher>, String> {
    match config.source.kind {
        SourceKind::Yahoo => {
            let fetcher = YahooChartFetcher::new(
                config.source.base_url.clone(),
                config.source.timeout_ms,
                config.source.auto_adjust,
            )
            .map_err(|err| {
                format!(
                    "failed to init yahoo client (url={}): {err}",
                    config.source.base_url
                )
            })?;
            Ok(Box::new(fetcher))
        }
        SourceKind::Csv => {
            let dir = config
                .source
                .dir
                .as_deref()
                .ok_or_else(|| "source.dir is required for csv source".to_string())?;
            Ok(Box::new(CsvDirFetcher::new(dir)))
        }
    }
}

fn build_notifier(config: &Config, dry_run: bool) -> Result<Box<dyn Notifier>, String> {
    if dry_run {
        return Ok(Box::new(LogOnlyNotifier::new()));
    }
    let creds = resolve_telegram_credentials(config)?;
    let notifier = TelegramNotifier::new(
        config.telegram.api_base.clone(),
        creds.bot_token,
        creds.chat_id,
        config.telegram.timeout_ms,
    )
    .map_err(|err| format!("failed to init telegram client: {err}"))?;
    Ok(Box::new(notifier))
}

fn build_audit_log(config: &Config) -> Box<dyn AuditLog> {
    Box::new(CsvAuditLog::new(
        &config.log.path,
        config.alert.policy.tracks_recency(),
    ))
}

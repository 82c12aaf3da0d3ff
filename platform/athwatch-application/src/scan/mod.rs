use crate::config::Config;
use crate::messages::{alert_message, summary_message};
use athwatch_domain::entities::alert_policy::AlertConfig;
use athwatch_domain::repositories::audit_log::AuditLog;
use athwatch_domain::repositories::market_data::SeriesFetcher;
use athwatch_domain::repositories::notifier::Notifier;
use athwatch_domain::services::alert::check_alert;
use athwatch_domain::services::ath::evaluate;
use athwatch_domain::value_objects::log_record::LogRecord;
use chrono::{Local, NaiveDateTime};
use std::thread;
use std::time::Duration;
use tracing::info_span;

#[derive(Debug, Clone)]
pub struct ScanPlan {
    pub symbols: Vec<String>,
    pub alert: AlertConfig,
    /// Blocking pause between consecutive symbols; zero disables pacing.
    pub pause: Duration,
}

impl ScanPlan {
    pub fn from_config(config: &Config) -> Self {
        Self {
            symbols: config.run.symbols.clone(),
            alert: config.alert_config(),
            pause: Duration::from_millis(config.run.pause_ms),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub total: usize,
    pub processed: usize,
    pub skipped: usize,
    /// Symbols the predicate fired for, in scan order, whether or not delivery succeeded.
    pub alerted: Vec<String>,
    pub notify_failures: usize,
    pub log_failures: usize,
    pub summary_delivered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolOutcome {
    Skipped {
        reason: String,
    },
    Evaluated {
        alerted: bool,
        delivered: bool,
        logged: bool,
    },
}

/// Evaluates one symbol end to end. Never fails: every problem is folded into the outcome.
pub fn scan_symbol(
    symbol: &str,
    alert: &AlertConfig,
    evaluated_at: NaiveDateTime,
    fetcher: &dyn SeriesFetcher,
    notifier: &dyn Notifier,
    audit_log: &dyn AuditLog,
) -> SymbolOutcome {
    let series = match fetcher.fetch_daily(symbol) {
        Ok(series) => series,
        Err(err) => {
            tracing::warn!(symbol, error = %err, "skipping symbol: fetch failed");
            return SymbolOutcome::Skipped {
                reason: err.to_string(),
            };
        }
    };

    let result = match evaluate(symbol, &series, evaluated_at) {
        Ok(result) => result,
        Err(err) => {
            tracing::warn!(symbol, error = %err, "skipping symbol: no data");
            return SymbolOutcome::Skipped {
                reason: err.to_string(),
            };
        }
    };

    tracing::info!(
        symbol,
        current_price = result.current_price,
        ath = result.all_time_high,
        diff_percent = result.diff_percent,
        candles_since_ath = ?result.candles_since_ath,
        "evaluated"
    );

    let decision = check_alert(&result, alert);
    let delivered = if decision.alert {
        notifier.notify(&alert_message(&result, alert))
    } else {
        tracing::debug!(
            symbol,
            policy = alert.policy.as_str(),
            failed = %decision.failed_labels(),
            "no alert"
        );
        false
    };

    let logged = match audit_log.append(&LogRecord::from_evaluation(&result, delivered)) {
        Ok(()) => true,
        Err(err) => {
            metrics::counter!("athwatch.audit.write_failures").increment(1);
            tracing::error!(symbol, error = %err, "failed to append audit record");
            false
        }
    };

    SymbolOutcome::Evaluated {
        alerted: decision.alert,
        delivered,
        logged,
    }
}

/// Scans every symbol in order, one at a time, then sends the end-of-run summary.
pub fn run_scan(
    plan: &ScanPlan,
    fetcher: &dyn SeriesFetcher,
    notifier: &dyn Notifier,
    audit_log: &dyn AuditLog,
) -> ScanSummary {
    let _span = info_span!(
        "scan",
        symbols = plan.symbols.len(),
        policy = plan.alert.policy.as_str(),
        threshold_pct = plan.alert.threshold_pct
    )
    .entered();

    let mut summary = ScanSummary {
        total: plan.symbols.len(),
        ..ScanSummary::default()
    };

    for (idx, symbol) in plan.symbols.iter().enumerate() {
        if idx > 0 && !plan.pause.is_zero() {
            thread::sleep(plan.pause);
        }

        let _symbol_span = info_span!("symbol", symbol = %symbol).entered();
        match scan_symbol(symbol, &plan.alert, now(), fetcher, notifier, audit_log) {
            SymbolOutcome::Skipped { .. } => {
                summary.skipped += 1;
                metrics::counter!("athwatch.scan.symbols_skipped").increment(1);
            }
            SymbolOutcome::Evaluated {
                alerted,
                delivered,
                logged,
            } => {
                summary.processed += 1;
                metrics::counter!("athwatch.scan.symbols_processed").increment(1);
                if alerted {
                    summary.alerted.push(symbol.clone());
                    metrics::counter!("athwatch.scan.alerts").increment(1);
                    if !delivered {
                        summary.notify_failures += 1;
                    }
                }
                if !logged {
                    summary.log_failures += 1;
                }
            }
        }
    }

    summary.summary_delivered = notifier.notify(&summary_message(&summary, &plan.alert, now()));

    tracing::info!(
        total = summary.total,
        processed = summary.processed,
        skipped = summary.skipped,
        alerted = summary.alerted.len(),
        notify_failures = summary.notify_failures,
        log_failures = summary.log_failures,
        summary_delivered = summary.summary_delivered,
        "scan complete"
    );
    summary
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

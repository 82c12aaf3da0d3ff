use crate::scan::ScanSummary;
use athwatch_domain::entities::alert_policy::AlertConfig;
use athwatch_domain::value_objects::evaluation::EvaluationResult;
use chrono::NaiveDateTime;

pub const MESSAGE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn alert_message(result: &EvaluationResult, config: &AlertConfig) -> String {
    let mut message = format!(
        "🚨 {} is near All-Time High!\nCurrent Price: {:.2}\nATH: {:.2}\nDifference: {:.2}%\n",
        result.symbol, result.current_price, result.all_time_high, result.diff_percent
    );
    if config.policy.tracks_recency() {
        if let Some(candles) = result.candles_since_ath {
            message.push_str(&format!("Candles since ATH: {candles}\n"));
        }
    }
    message.push_str(&format!(
        "Time: {}",
        result.evaluated_at.format(MESSAGE_TIME_FORMAT)
    ));
    message
}

pub fn summary_message(summary: &ScanSummary, config: &AlertConfig, at: NaiveDateTime) -> String {
    let symbols = if summary.alerted.is_empty() {
        "None".to_string()
    } else {
        summary.alerted.join(", ")
    };
    format!(
        "✅ ATH Alert Summary ({})\nTotal Stocks Checked: {}\nProcessed: {}\nSkipped: {}\nNear ATH (≤{}%): {}\nStocks: {}",
        at.format(MESSAGE_TIME_FORMAT),
        summary.total,
        summary.processed,
        summary.skipped,
        config.threshold_pct,
        summary.alerted.len(),
        symbols
    )
}

#[cfg(test)]
mod tests {
    use super::{alert_message, summary_message};
    use crate::scan::ScanSummary;
    use athwatch_domain::entities::alert_policy::AlertConfig;
    use athwatch_domain::value_objects::evaluation::EvaluationResult;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 4)
            .and_then(|d| d.and_hms_opt(15, 35, 9))
            .expect("valid timestamp")
    }

    fn result() -> EvaluationResult {
        EvaluationResult {
            symbol: "TITAN.NS".to_string(),
            current_price: 3499.4,
            all_time_high: 3510.0,
            diff_percent: 0.30039886,
            candles_since_ath: Some(14),
            evaluated_at: at(),
        }
    }

    #[test]
    fn alert_message_lists_prices_with_two_decimals() {
        let text = alert_message(&result(), &AlertConfig::simple_proximity(0.5));
        assert_eq!(
            text,
            "🚨 TITAN.NS is near All-Time High!\nCurrent Price: 3499.40\nATH: 3510.00\nDifference: 0.30%\nTime: 2025-07-04 15:35:09"
        );
    }

    #[test]
    fn alert_message_includes_recency_for_strict_pullback() {
        let text = alert_message(&result(), &AlertConfig::strict_pullback(2.0, 10));
        assert!(text.contains("Candles since ATH: 14\n"));
    }

    #[test]
    fn summary_message_marks_empty_alert_list_as_none() {
        let summary = ScanSummary {
            total: 3,
            processed: 2,
            skipped: 1,
            ..ScanSummary::default()
        };
        let text = summary_message(&summary, &AlertConfig::simple_proximity(0.5), at());
        assert!(text.starts_with("✅ ATH Alert Summary (2025-07-04 15:35:09)"));
        assert!(text.contains("Total Stocks Checked: 3\n"));
        assert!(text.contains("Near ATH (≤0.5%): 0\n"));
        assert!(text.ends_with("Stocks: None"));
    }

    #[test]
    fn summary_message_joins_alerted_symbols() {
        let summary = ScanSummary {
            total: 2,
            processed: 2,
            alerted: vec!["INFY.NS".to_string(), "TCS.NS".to_string()],
            ..ScanSummary::default()
        };
        let text = summary_message(&summary, &AlertConfig::strict_pullback(2.0, 10), at());
        assert!(text.contains("Near ATH (≤2%): 2\n"));
        assert!(text.ends_with("Stocks: INFY.NS, TCS.NS"));
    }
}

use crate::value_objects::evaluation::EvaluationResult;
use chrono::NaiveDateTime;

/// One audit row per evaluated symbol. Never rewritten once appended.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub timestamp: NaiveDateTime,
    pub symbol: String,
    pub current_price: f64,
    pub ath: f64,
    pub diff_percent: f64,
    pub candles_since_ath: Option<usize>,
    pub alert_sent: bool,
}

impl LogRecord {
    pub fn from_evaluation(result: &EvaluationResult, alert_sent: bool) -> Self {
        Self {
            timestamp: result.evaluated_at,
            symbol: result.symbol.clone(),
            current_price: result.current_price,
            ath: result.all_time_high,
            diff_percent: result.diff_percent,
            candles_since_ath: result.candles_since_ath,
            alert_sent,
        }
    }
}

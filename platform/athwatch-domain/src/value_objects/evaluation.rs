use chrono::NaiveDateTime;
use serde::Serialize;

/// Outcome of evaluating one symbol's price history against its all-time high.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub symbol: String,
    /// Close of the most recent bar.
    pub current_price: f64,
    /// Highest `high` over the whole retrieved history.
    pub all_time_high: f64,
    /// Distance below the ATH in percent; 0.0 when the close is at or above it.
    pub diff_percent: f64,
    /// Bars printed after the latest bar that set the ATH.
    pub candles_since_ath: Option<usize>,
    pub evaluated_at: NaiveDateTime,
}

impl EvaluationResult {
    pub fn is_below_ath(&self) -> bool {
        self.current_price < self.all_time_high
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day. Only the fields the ATH evaluation reads are kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub high: f64,
    pub close: f64,
}

impl DailyBar {
    pub fn new(date: NaiveDate, high: f64, close: f64) -> Self {
        Self { date, high, close }
    }

    pub fn is_valid(&self) -> bool {
        self.high.is_finite() && self.high > 0.0 && self.close.is_finite() && self.close > 0.0
    }
}

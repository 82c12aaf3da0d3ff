use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPolicy {
    /// Alert whenever the close is within `threshold_pct` of the ATH, including at or above it.
    SimpleProximity,
    /// Alert only on a pullback: below the ATH, within threshold, and the ATH is older
    /// than `min_candles_since_ath` bars.
    StrictPullback,
}

impl AlertPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertPolicy::SimpleProximity => "simple_proximity",
            AlertPolicy::StrictPullback => "strict_pullback",
        }
    }

    /// Whether this policy depends on ATH recency, and so whether the audit log carries it.
    pub fn tracks_recency(&self) -> bool {
        matches!(self, AlertPolicy::StrictPullback)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertConfig {
    pub policy: AlertPolicy,
    pub threshold_pct: f64,
    pub min_candles_since_ath: usize,
}

impl AlertConfig {
    pub fn simple_proximity(threshold_pct: f64) -> Self {
        Self {
            policy: AlertPolicy::SimpleProximity,
            threshold_pct,
            min_candles_since_ath: 0,
        }
    }

    pub fn strict_pullback(threshold_pct: f64, min_candles_since_ath: usize) -> Self {
        Self {
            policy: AlertPolicy::StrictPullback,
            threshold_pct,
            min_candles_since_ath,
        }
    }
}

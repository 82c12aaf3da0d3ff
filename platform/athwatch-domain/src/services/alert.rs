use crate::entities::alert_policy::{AlertConfig, AlertPolicy};
use crate::value_objects::evaluation::EvaluationResult;

/// Named conditions of the alert predicate, reported when they do not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertCondition {
    WithinThreshold,
    BelowAllTimeHigh,
    StaleAllTimeHigh,
}

impl AlertCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertCondition::WithinThreshold => "within_threshold",
            AlertCondition::BelowAllTimeHigh => "below_ath",
            AlertCondition::StaleAllTimeHigh => "stale_ath",
        }
    }
}

impl std::fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertDecision {
    pub alert: bool,
    pub failed: Vec<AlertCondition>,
}

impl AlertDecision {
    pub fn failed_labels(&self) -> String {
        self.failed
            .iter()
            .map(AlertCondition::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Checks every condition the policy requires so diagnostics see all of them,
/// not just the first that failed.
pub fn check_alert(result: &EvaluationResult, config: &AlertConfig) -> AlertDecision {
    let mut failed = Vec::new();

    if result.diff_percent > config.threshold_pct || config.threshold_pct.is_nan() {
        failed.push(AlertCondition::WithinThreshold);
    }

    if config.policy == AlertPolicy::StrictPullback {
        if !result.is_below_ath() {
            failed.push(AlertCondition::BelowAllTimeHigh);
        }
        let stale = result
            .candles_since_ath
            .is_some_and(|candles| candles > config.min_candles_since_ath);
        if !stale {
            failed.push(AlertCondition::StaleAllTimeHigh);
        }
    }

    AlertDecision {
        alert: failed.is_empty(),
        failed,
    }
}

pub fn should_alert(result: &EvaluationResult, config: &AlertConfig) -> bool {
    check_alert(result, config).alert
}

use crate::value_objects::bar::DailyBar;
use crate::value_objects::evaluation::EvaluationResult;
use crate::value_objects::price_series::PriceSeries;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    EmptySeries { symbol: String },
}

impl std::fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluationError::EmptySeries { symbol } => write!(f, "no bars for {symbol}"),
        }
    }
}

impl std::error::Error for EvaluationError {}

/// Peak `high` of a bar slice and the index of the latest bar that printed it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AthLocation {
    pub price: f64,
    pub index: usize,
}

/// Single pass over `bars`; ties move the location forward so the most recent
/// occurrence of the peak wins.
pub fn locate_all_time_high(bars: &[DailyBar]) -> Option<AthLocation> {
    let mut best: Option<AthLocation> = None;
    for (index, bar) in bars.iter().enumerate() {
        let replace = match best {
            Some(current) => bar.high >= current.price,
            None => true,
        };
        if replace {
            best = Some(AthLocation {
                price: bar.high,
                index,
            });
        }
    }
    best
}

pub fn diff_from_ath_pct(current_price: f64, all_time_high: f64) -> f64 {
    if current_price >= all_time_high {
        return 0.0;
    }
    (all_time_high - current_price) / all_time_high * 100.0
}

pub fn evaluate(
    symbol: &str,
    series: &PriceSeries,
    evaluated_at: NaiveDateTime,
) -> Result<EvaluationResult, EvaluationError> {
    let bars = series.bars();
    let (Some(last), Some(peak)) = (bars.last(), locate_all_time_high(bars)) else {
        return Err(EvaluationError::EmptySeries {
            symbol: symbol.to_string(),
        });
    };

    let last_index = bars.len() - 1;
    let current_price = last.close;
    let all_time_high = peak.price;

    Ok(EvaluationResult {
        symbol: symbol.to_string(),
        current_price,
        all_time_high,
        diff_percent: diff_from_ath_pct(current_price, all_time_high),
        candles_since_ath: last_index.checked_sub(peak.index),
        evaluated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::{diff_from_ath_pct, evaluate, locate_all_time_high, EvaluationError};
    use crate::value_objects::bar::DailyBar;
    use crate::value_objects::price_series::PriceSeries;
    use chrono::{Days, NaiveDate, NaiveDateTime};

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .and_then(|d| d.and_hms_opt(15, 30, 0))
            .expect("valid timestamp")
    }

    fn series(rows: &[(f64, f64)]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
        let bars = rows
            .iter()
            .enumerate()
            .map(|(idx, (high, close))| {
                let date = start
                    .checked_add_days(Days::new(idx as u64))
                    .expect("date in range");
                DailyBar::new(date, *high, *close)
            })
            .collect();
        PriceSeries::new(bars).expect("valid series")
    }

    #[test]
    fn empty_series_is_rejected() {
        let err = evaluate("INFY.NS", &PriceSeries::empty(), at()).expect_err("empty");
        assert_eq!(
            err,
            EvaluationError::EmptySeries {
                symbol: "INFY.NS".to_string()
            }
        );
    }

    #[test]
    fn ties_resolve_to_latest_peak() {
        let s = series(&[(100.0, 95.0), (90.0, 88.0), (100.0, 97.0), (95.0, 94.0)]);
        let peak = locate_all_time_high(s.bars()).expect("peak");
        assert_eq!(peak.index, 2);

        let result = evaluate("TCS.NS", &s, at()).expect("evaluated");
        assert_eq!(result.candles_since_ath, Some(1));
    }

    #[test]
    fn close_above_earlier_high_clamps_diff_to_zero() {
        let s = series(&[(100.0, 99.0), (101.0, 101.0)]);
        let result = evaluate("RELIANCE.NS", &s, at()).expect("evaluated");
        assert_eq!(result.all_time_high, 101.0);
        assert_eq!(result.diff_percent, 0.0);
        assert_eq!(result.candles_since_ath, Some(0));
    }

    #[test]
    fn ath_comes_from_highs_and_price_from_closes() {
        let s = series(&[(50.0, 49.0), (80.0, 60.0), (70.0, 64.0)]);
        let result = evaluate("HDFCBANK.NS", &s, at()).expect("evaluated");
        assert_eq!(result.current_price, 64.0);
        assert_eq!(result.all_time_high, 80.0);
        assert!((result.diff_percent - 20.0).abs() < 1e-9);
        assert_eq!(result.candles_since_ath, Some(1));
        assert_eq!(result.evaluated_at, at());
    }

    #[test]
    fn diff_is_zero_at_or_above_ath() {
        assert_eq!(diff_from_ath_pct(100.0, 100.0), 0.0);
        assert_eq!(diff_from_ath_pct(101.0, 100.0), 0.0);
        assert!((diff_from_ath_pct(98.0, 100.0) - 2.0).abs() < 1e-12);
    }
}

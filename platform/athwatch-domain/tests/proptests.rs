use athwatch_domain::entities::alert_policy::AlertConfig;
use athwatch_domain::services::alert::should_alert;
use athwatch_domain::services::ath::evaluate;
use athwatch_domain::value_objects::bar::DailyBar;
use athwatch_domain::value_objects::price_series::PriceSeries;
use chrono::{Days, NaiveDate, NaiveDateTime};
use proptest::prelude::*;

fn evaluated_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 1)
        .and_then(|d| d.and_hms_opt(18, 0, 0))
        .expect("valid timestamp")
}

fn series(rows: &[(f64, f64)]) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2000, 1, 3).expect("valid date");
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

fn rows_strategy() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((0.01f64..10_000.0, 0.01f64..10_000.0), 1..120)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn ath_is_the_maximum_high(rows in rows_strategy()) {
        let result = evaluate("X", &series(&rows), evaluated_at()).expect("non-empty");
        let max_high = rows.iter().map(|(h, _)| *h).fold(f64::MIN, f64::max);
        prop_assert!(result.all_time_high >= 0.0);
        prop_assert_eq!(result.all_time_high, max_high);
        prop_assert!(rows.iter().any(|(h, _)| *h == result.all_time_high));
    }

    #[test]
    fn diff_percent_is_bounded_and_zero_at_or_above_ath(rows in rows_strategy()) {
        let result = evaluate("X", &series(&rows), evaluated_at()).expect("non-empty");
        prop_assert!((0.0..=100.0).contains(&result.diff_percent));
        if result.current_price >= result.all_time_high {
            prop_assert_eq!(result.diff_percent, 0.0);
        }
    }

    #[test]
    fn candles_since_ath_counts_from_latest_peak(rows in rows_strategy()) {
        let result = evaluate("X", &series(&rows), evaluated_at()).expect("non-empty");
        let last_peak = rows
            .iter()
            .rposition(|(h, _)| *h == result.all_time_high)
            .expect("peak present");
        prop_assert_eq!(result.candles_since_ath, Some(rows.len() - 1 - last_peak));
    }

    #[test]
    fn evaluation_is_deterministic(rows in rows_strategy()) {
        let s = series(&rows);
        let first = evaluate("X", &s, evaluated_at()).expect("non-empty");
        let second = evaluate("X", &s, evaluated_at()).expect("non-empty");
        prop_assert_eq!(first.current_price.to_bits(), second.current_price.to_bits());
        prop_assert_eq!(first.all_time_high.to_bits(), second.all_time_high.to_bits());
        prop_assert_eq!(first.diff_percent.to_bits(), second.diff_percent.to_bits());
        prop_assert_eq!(first.candles_since_ath, second.candles_since_ath);
    }

    #[test]
    fn simple_proximity_matches_threshold_and_is_monotonic(
        rows in rows_strategy(),
        low in 0.0f64..50.0,
        bump in 0.0f64..50.0,
    ) {
        let result = evaluate("X", &series(&rows), evaluated_at()).expect("non-empty");
        let at_low = should_alert(&result, &AlertConfig::simple_proximity(low));
        prop_assert_eq!(at_low, result.diff_percent <= low);
        if at_low {
            prop_assert!(should_alert(&result, &AlertConfig::simple_proximity(low + bump)));
        }
    }

    #[test]
    fn strict_pullback_never_alerts_on_fresh_or_touching_highs(
        rows in rows_strategy(),
        threshold in 0.0f64..100.0,
        min_candles in 0usize..150,
    ) {
        let result = evaluate("X", &series(&rows), evaluated_at()).expect("non-empty");
        let config = AlertConfig::strict_pullback(threshold, min_candles);
        let fired = should_alert(&result, &config);
        if result.current_price == result.all_time_high {
            prop_assert!(!fired);
        }
        if result.candles_since_ath.map_or(true, |c| c <= min_candles) {
            prop_assert!(!fired);
        }
    }
}

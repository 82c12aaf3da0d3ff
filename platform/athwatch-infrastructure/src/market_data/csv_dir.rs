use athwatch_domain::repositories::market_data::{FetchError, SeriesFetcher};
use athwatch_domain::value_objects::bar::DailyBar;
use athwatch_domain::value_objects::price_series::PriceSeries;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct DailyRecord {
    #[serde(alias = "Date")]
    date: String,
    #[serde(alias = "High")]
    high: Option<f64>,
    #[serde(alias = "Close")]
    close: Option<f64>,
}

/// Offline source: one `<SYMBOL>.csv` per symbol with at least `date,high,close`.
#[derive(Debug, Clone)]
pub struct CsvDirFetcher {
    dir: PathBuf,
}

impl CsvDirFetcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

impl SeriesFetcher for CsvDirFetcher {
    fn fetch_daily(&self, symbol: &str) -> Result<PriceSeries, FetchError> {
        load_daily_csv(&self.path_for(symbol))
    }
}

pub fn load_daily_csv(path: &Path) -> Result<PriceSeries, FetchError> {
    let file = File::open(path).map_err(|err| {
        FetchError::Transport(format!("failed to open daily CSV {}: {}", path.display(), err))
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let mut bars = Vec::new();
    let mut invalid = 0usize;
    for result in reader.deserialize::<DailyRecord>() {
        let record =
            result.map_err(|err| FetchError::Malformed(format!("failed to parse CSV row: {err}")))?;
        let date = parse_date(&record.date).map_err(FetchError::Malformed)?;
        let (Some(high), Some(close)) = (record.high, record.close) else {
            invalid += 1;
            continue;
        };
        let bar = DailyBar::new(date, high, close);
        if !bar.is_valid() {
            invalid += 1;
            continue;
        }
        bars.push(bar);
    }

    if invalid > 0 {
        tracing::warn!(path = %path.display(), invalid, "skipped rows with missing or invalid prices");
    }

    Ok(PriceSeries::from_unordered(bars)?)
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.date_naive());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.date());
    }
    Err(format!("unsupported date format: {value}"))
}

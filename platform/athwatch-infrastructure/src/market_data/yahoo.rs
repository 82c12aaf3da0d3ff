use athwatch_domain::repositories::market_data::{FetchError, SeriesFetcher};
use athwatch_domain::value_objects::bar::DailyBar;
use athwatch_domain::value_objects::price_series::PriceSeries;
use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use std::time::{Duration, Instant};

pub const YAHOO_DEFAULT_BASE: &str = "https://query1.finance.yahoo.com";
/// 1900-01-01 00:00:00 UTC; earlier than any listing Yahoo serves.
pub const HISTORY_START_EPOCH: i64 = -2_208_988_800;
/// Only daily bars are accepted. Yahoo coarsens `interval` on `range=max` requests.
const DAILY_GRANULARITY: &str = "1d";
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
    #[serde(rename = "dataGranularity")]
    data_granularity: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Daily history from the Yahoo Finance v8 chart endpoint, full range.
pub struct YahooChartFetcher {
    pub base_url: String,
    pub timeout_ms: u64,
    pub auto_adjust: bool,
    client: Client,
}

impl YahooChartFetcher {
    pub fn new(base_url: String, timeout_ms: u64, auto_adjust: bool) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| format!("failed to build http client: {err}"))?;
        Ok(Self {
            base_url,
            timeout_ms,
            auto_adjust,
            client,
        })
    }

    fn chart_url(&self, symbol: &str, until_epoch: i64) -> Result<Url, FetchError> {
        let mut url = Url::parse(self.base_url.trim_end_matches('/'))
            .map_err(|err| FetchError::Transport(format!("invalid yahoo base url: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Transport("yahoo base url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        url.query_pairs_mut()
            .append_pair("period1", &HISTORY_START_EPOCH.to_string())
            .append_pair("period2", &until_epoch.to_string())
            .append_pair("interval", DAILY_GRANULARITY)
            .append_pair("events", "div,split")
            .append_pair("includeAdjustedClose", "true");
        Ok(url)
    }
}

impl SeriesFetcher for YahooChartFetcher {
    fn fetch_daily(&self, symbol: &str) -> Result<PriceSeries, FetchError> {
        let url = self.chart_url(symbol, Utc::now().timestamp())?;
        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| FetchError::Transport(format!("yahoo request failed: {err}")))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|err| FetchError::Transport(format!("failed to read yahoo response: {err}")))?;
        metrics::histogram!("athwatch.fetch_ms").record(start.elapsed().as_millis() as f64);

        if !status.is_success() {
            // Unknown symbols come back as 404 with a chart.error payload.
            if let Ok(parsed) = serde_json::from_str::<ChartResponse>(&body) {
                if let Some(err) = parsed.chart.error {
                    return Err(FetchError::Malformed(format!(
                        "{}: {}",
                        err.code, err.description
                    )));
                }
            }
            return Err(FetchError::Transport(format!(
                "yahoo http error: status {}",
                status.as_u16()
            )));
        }

        let series = parse_chart(&body, self.auto_adjust)?;
        tracing::debug!(symbol, bars = series.len(), "fetched daily history");
        Ok(series)
    }
}

/// Flattens a chart payload into a [`PriceSeries`].
///
/// Bars with a null or non-positive high/close are dropped, as are bars without an
/// adjusted close when `auto_adjust` is set. Dates are exchange-local via `gmtoffset`.
/// A payload whose `dataGranularity` is not daily is `Malformed`.
pub fn parse_chart(body: &str, auto_adjust: bool) -> Result<PriceSeries, FetchError> {
    let parsed: ChartResponse = serde_json::from_str(body)
        .map_err(|err| FetchError::Malformed(format!("failed to parse chart response: {err}")))?;

    if let Some(err) = parsed.chart.error {
        return Err(FetchError::Malformed(format!(
            "{}: {}",
            err.code, err.description
        )));
    }

    let result = parsed
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| FetchError::Malformed("chart response has no result".to_string()))?;

    if let Some(granularity) = result.meta.data_granularity.as_deref() {
        if granularity != DAILY_GRANULARITY {
            return Err(FetchError::Malformed(format!(
                "expected daily bars, chart returned granularity {granularity}"
            )));
        }
    }

    let Some(timestamps) = result.timestamp else {
        return Ok(PriceSeries::empty());
    };
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .and_then(|series| series.into_iter().next())
        .map(|series| series.adjclose);

    if auto_adjust && adjclose.is_none() && !timestamps.is_empty() {
        return Err(FetchError::Malformed(
            "chart response has no adjclose series".to_string(),
        ));
    }

    let mut bars = Vec::with_capacity(timestamps.len());
    let mut dropped = 0usize;
    for (idx, ts) in timestamps.iter().copied().enumerate() {
        let high = quote.high.get(idx).copied().flatten();
        let close = quote.close.get(idx).copied().flatten();
        let date = DateTime::from_timestamp(ts + result.meta.gmtoffset, 0).map(|dt| dt.date_naive());

        let (Some(high), Some(close), Some(date)) = (high, close, date) else {
            dropped += 1;
            continue;
        };

        let bar = if auto_adjust {
            let adjusted = adjclose
                .as_ref()
                .and_then(|values| values.get(idx).copied().flatten());
            match adjusted {
                Some(adj) if close > 0.0 => DailyBar::new(date, high * adj / close, adj),
                _ => {
                    dropped += 1;
                    continue;
                }
            }
        } else {
            DailyBar::new(date, high, close)
        };

        if !bar.is_valid() {
            dropped += 1;
            continue;
        }
        bars.push(bar);
    }

    if dropped > 0 {
        tracing::debug!(dropped, "dropped incomplete chart rows");
    }

    Ok(PriceSeries::from_unordered(bars)?)
}

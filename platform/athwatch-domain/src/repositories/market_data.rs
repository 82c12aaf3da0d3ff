use crate::value_objects::price_series::{PriceSeries, SeriesError};

#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    Transport(String),
    Malformed(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Transport(msg) => write!(f, "transport: {msg}"),
            FetchError::Malformed(msg) => write!(f, "malformed series: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<SeriesError> for FetchError {
    fn from(err: SeriesError) -> Self {
        FetchError::Malformed(err.to_string())
    }
}

/// Source of full daily history for a symbol. Implementations normalize whatever
/// shape the upstream returns into a [`PriceSeries`]; an empty series is not an error here.
pub trait SeriesFetcher {
    fn fetch_daily(&self, symbol: &str) -> Result<PriceSeries, FetchError>;
}

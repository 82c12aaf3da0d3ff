use crate::value_objects::bar::DailyBar;
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum SeriesError {
    InvalidBar { date: NaiveDate, high: f64, close: f64 },
    OutOfOrder { date: NaiveDate },
    DuplicateDate { date: NaiveDate },
}

impl std::fmt::Display for SeriesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesError::InvalidBar { date, high, close } => {
                write!(f, "invalid bar on {date}: high={high} close={close}")
            }
            SeriesError::OutOfOrder { date } => write!(f, "bar on {date} is out of order"),
            SeriesError::DuplicateDate { date } => write!(f, "duplicate bar for {date}"),
        }
    }
}

impl std::error::Error for SeriesError {}

/// Daily bars in strictly ascending date order with positive, finite prices.
///
/// Adapters build one per fetch; the evaluator relies on the ordering to
/// treat the last bar as the current session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    bars: Vec<DailyBar>,
}

impl PriceSeries {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Accepts bars that are already ordered; rejects anything that breaks the invariant.
    pub fn new(bars: Vec<DailyBar>) -> Result<Self, SeriesError> {
        let mut prev: Option<NaiveDate> = None;
        for bar in &bars {
            if !bar.is_valid() {
                return Err(SeriesError::InvalidBar {
                    date: bar.date,
                    high: bar.high,
                    close: bar.close,
                });
            }
            if let Some(prev) = prev {
                if bar.date == prev {
                    return Err(SeriesError::DuplicateDate { date: bar.date });
                }
                if bar.date < prev {
                    return Err(SeriesError::OutOfOrder { date: bar.date });
                }
            }
            prev = Some(bar.date);
        }
        Ok(Self { bars })
    }

    /// Canonicalizes raw source rows: sorts by date and keeps the last row seen per date.
    pub fn from_unordered(bars: impl IntoIterator<Item = DailyBar>) -> Result<Self, SeriesError> {
        let mut by_date: BTreeMap<NaiveDate, DailyBar> = BTreeMap::new();
        for bar in bars {
            by_date.insert(bar.date, bar);
        }
        Self::new(by_date.into_values().collect())
    }

    pub fn bars(&self) -> &[DailyBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&DailyBar> {
        self.bars.last()
    }
}

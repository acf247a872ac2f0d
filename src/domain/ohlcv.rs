//! OHLCV bar representation.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    /// high - low
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// close - open
    pub fn body(&self) -> f64 {
        self.close - self.open
    }
}

/// Why a bar sequence was rejected as a series.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeriesError {
    #[error("duplicate bar for {0}")]
    DuplicateDate(NaiveDate),

    #[error("negative volume {volume} on {date}")]
    NegativeVolume { date: NaiveDate, volume: i64 },
}

/// Bars for one symbol, strictly ascending by date.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    symbol: String,
    bars: Vec<OhlcvBar>,
}

impl BarSeries {
    /// Sorts `bars` by date and checks the series invariants.
    pub fn from_unsorted(
        symbol: impl Into<String>,
        mut bars: Vec<OhlcvBar>,
    ) -> Result<Self, SeriesError> {
        bars.sort_by_key(|b| b.date);

        for pair in bars.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(SeriesError::DuplicateDate(pair[1].date));
            }
        }
        if let Some(bar) = bars.iter().find(|b| b.volume < 0) {
            return Err(SeriesError::NegativeVolume {
                date: bar.date,
                volume: bar.volume,
            });
        }

        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&OhlcvBar> {
        self.bars.last()
    }

    /// Drops every bar dated before `cutoff`.
    pub fn since(mut self, cutoff: NaiveDate) -> Self {
        self.bars.retain(|b| b.date >= cutoff);
        self
    }
}

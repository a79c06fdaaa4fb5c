//! Market data interfaces and the in-memory feed used by backtests.
//!
//! Two seams: `MarketDataFeed` is the provider-style interface (latest or
//! historical bars on demand, exchange-local timestamps), and `BarFeed` is
//! the pull interface the backtest engine iterates. `InMemoryFeed`
//! implements both over a pre-loaded bar series.

use chrono::NaiveDate;
use thiserror::Error;
use tracing::warn;

use crate::domain::Bar;

/// Bar interval granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Minute,
    Day,
}

/// Structured error types for data operations. The only error class that
/// terminates a backtest run.
#[derive(Debug, Clone, Error)]
pub enum DataError {
    #[error("provider failure: {0}")]
    Provider(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("invalid date range: {start} to {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// Provider-style interface to a market data source.
pub trait MarketDataFeed {
    /// The most recent `limit` bars for a symbol.
    fn latest_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Bar>, DataError>;

    /// Bars for a symbol over an inclusive date range.
    fn historical_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        timeframe: Timeframe,
    ) -> Result<Vec<Bar>, DataError>;
}

/// Pull interface the backtest engine drives: one bar per step,
/// `Ok(None)` when the source is exhausted.
pub trait BarFeed {
    fn next_bar(&mut self) -> Result<Option<Bar>, DataError>;
}

/// Chronologically ordered bars held in memory.
///
/// Insane bars (inverted ranges, non-positive or NaN prices) are dropped at
/// construction with a warning, so downstream consumers only ever see
/// usable data.
#[derive(Debug, Clone)]
pub struct InMemoryFeed {
    symbol: String,
    bars: Vec<Bar>,
    cursor: usize,
}

impl InMemoryFeed {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        let symbol = symbol.into();
        let mut kept = Vec::with_capacity(bars.len());
        for bar in bars {
            if bar.is_sane() {
                kept.push(bar);
            } else {
                warn!(symbol = %bar.symbol, date = %bar.date, "dropping insane bar");
            }
        }
        Self {
            symbol,
            bars: kept,
            cursor: 0,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

impl BarFeed for InMemoryFeed {
    fn next_bar(&mut self) -> Result<Option<Bar>, DataError> {
        let bar = self.bars.get(self.cursor).cloned();
        if bar.is_some() {
            self.cursor += 1;
        }
        Ok(bar)
    }
}

impl MarketDataFeed for InMemoryFeed {
    fn latest_bars(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Bar>, DataError> {
        if symbol != self.symbol {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let start = self.bars.len().saturating_sub(limit);
        Ok(self.bars[start..].to_vec())
    }

    fn historical_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        _timeframe: Timeframe,
    ) -> Result<Vec<Bar>, DataError> {
        if symbol != self.symbol {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        if end < start {
            return Err(DataError::InvalidRange { start, end });
        }
        Ok(self
            .bars
            .iter()
            .filter(|b| b.date >= start && b.date <= end)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> Bar {
        Bar {
            symbol: "SPY".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn feed_yields_bars_in_order_then_exhausts() {
        let mut feed = InMemoryFeed::new("SPY", vec![bar(2, 100.0), bar(3, 101.0)]);
        assert_eq!(feed.next_bar().unwrap().unwrap().close, 100.0);
        assert_eq!(feed.next_bar().unwrap().unwrap().close, 101.0);
        assert!(feed.next_bar().unwrap().is_none());
        // exhaustion is stable
        assert!(feed.next_bar().unwrap().is_none());
    }

    #[test]
    fn insane_bars_are_dropped() {
        let mut bad = bar(2, 100.0);
        bad.high = 90.0; // below low
        let feed = InMemoryFeed::new("SPY", vec![bad, bar(3, 101.0)]);
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn latest_bars_returns_tail() {
        let feed = InMemoryFeed::new("SPY", vec![bar(2, 100.0), bar(3, 101.0), bar(4, 102.0)]);
        let latest = feed.latest_bars("SPY", Timeframe::Day, 2).unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].close, 101.0);
    }

    #[test]
    fn unknown_symbol_is_an_error() {
        let feed = InMemoryFeed::new("SPY", vec![bar(2, 100.0)]);
        assert!(matches!(
            feed.latest_bars("QQQ", Timeframe::Day, 1),
            Err(DataError::SymbolNotFound { .. })
        ));
    }

    #[test]
    fn historical_bars_filters_by_range() {
        let feed = InMemoryFeed::new("SPY", vec![bar(2, 100.0), bar(3, 101.0), bar(4, 102.0)]);
        let start = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
        let bars = feed.historical_bars("SPY", start, end, Timeframe::Day).unwrap();
        assert_eq!(bars.len(), 2);
        assert!(matches!(
            feed.historical_bars("SPY", end, start, Timeframe::Day),
            Err(DataError::InvalidRange { .. })
        ));
    }
}

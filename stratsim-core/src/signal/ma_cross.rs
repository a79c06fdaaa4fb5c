//! Dual moving-average crossover — the reference signal source.
//!
//! Indicator: `1` when the short SMA is above the long SMA, else `0`. The
//! signal is the day-over-day change of that indicator, so exactly one
//! non-zero entry is emitted at each crossover: `+1` bullish, `-1` bearish.

use super::{Signal, SignalError, SignalSource};

/// Dual simple-moving-average crossover.
#[derive(Debug, Clone)]
pub struct MaCrossover {
    short_window: usize,
    long_window: usize,
}

impl MaCrossover {
    /// Classic 50/200 golden-cross defaults.
    pub const DEFAULT_SHORT_WINDOW: usize = 50;
    pub const DEFAULT_LONG_WINDOW: usize = 200;

    pub fn new(short_window: usize, long_window: usize) -> Self {
        assert!(short_window > 0, "short_window must be > 0");
        assert!(
            long_window > short_window,
            "long_window must be > short_window"
        );
        Self {
            short_window,
            long_window,
        }
    }

    /// Trailing simple moving average ending at each index; defined from
    /// index `window - 1` onwards.
    fn sma_at(closes: &[f64], window: usize, end: usize) -> f64 {
        let slice = &closes[end + 1 - window..=end];
        slice.iter().sum::<f64>() / window as f64
    }
}

impl Default for MaCrossover {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SHORT_WINDOW, Self::DEFAULT_LONG_WINDOW)
    }
}

impl SignalSource for MaCrossover {
    fn name(&self) -> &str {
        "ma_crossover"
    }

    fn warmup_bars(&self) -> usize {
        self.long_window
    }

    fn generate_signals(&self, closes: &[f64]) -> Result<Vec<Signal>, SignalError> {
        let first_defined = self.long_window - 1;
        if closes.len() <= first_defined {
            return Ok(Vec::new());
        }

        let mut signals = Vec::with_capacity(closes.len() - first_defined);
        let mut prev_above: Option<bool> = None;
        for i in first_defined..closes.len() {
            let short = Self::sma_at(closes, self.short_window, i);
            let long = Self::sma_at(closes, self.long_window, i);
            let above = short > long;
            let signal = match prev_above {
                Some(was_above) if above && !was_above => Signal::Long,
                Some(was_above) if !above && was_above => Signal::Short,
                // First defined day has no prior indicator to diff against.
                _ => Signal::Flat,
            };
            signals.push(signal);
            prev_above = Some(above);
        }
        Ok(signals)
    }
}

//! Signal sources — directional trading signals from close-price history.

pub mod ma_cross;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use ma_cross::MaCrossover;

/// Directional trading signal for one time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Long,
    Flat,
    Short,
}

impl Signal {
    /// Numeric form: +1 long, 0 flat, -1 short.
    pub fn value(self) -> i8 {
        match self {
            Signal::Long => 1,
            Signal::Flat => 0,
            Signal::Short => -1,
        }
    }
}

/// Signal source failure. Logged by the engine; the step is skipped.
#[derive(Debug, Clone, Error)]
pub enum SignalError {
    #[error("insufficient history: need {required} closes, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("signal source failure: {0}")]
    Other(String),
}

/// Produces a directional signal per time step from close-price history.
///
/// Implementations are pure with respect to the ledger: they see prices,
/// never portfolio state.
pub trait SignalSource {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Number of closes needed before the first signal is defined.
    fn warmup_bars(&self) -> usize;

    /// Full signal sequence for a close-price history. Undefined leading
    /// entries are dropped, not zero-filled: the output length is
    /// `closes.len() − warmup_bars() + 1` (empty when shorter).
    fn generate_signals(&self, closes: &[f64]) -> Result<Vec<Signal>, SignalError>;

    /// Signal for the most recent close; `Flat` while warming up.
    fn current(&self, closes: &[f64]) -> Result<Signal, SignalError> {
        Ok(self
            .generate_signals(closes)?
            .last()
            .copied()
            .unwrap_or(Signal::Flat))
    }
}

//! Run record — the append-only audit trail of a backtest.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::Order;
use crate::signal::Signal;

/// One entry per processed bar.
///
/// Carries the resulting ledger state and the bar close, so equity and
/// daily returns can be reconstructed without replaying the simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecordEntry {
    pub date: NaiveDate,
    pub signal: Signal,
    /// Entry order placed this step, if any (protective stops are issued
    /// alongside and logged, not recorded as the step's order).
    pub order: Option<Order>,
    pub cash: f64,
    pub positions: HashMap<String, i64>,
    pub close: f64,
}

/// Ordered, append-only sequence of per-bar entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub symbol: String,
    pub initial_cash: f64,
    pub entries: Vec<RunRecordEntry>,
}

impl RunRecord {
    pub fn new(symbol: impl Into<String>, initial_cash: f64) -> Self {
        Self {
            symbol: symbol.into(),
            initial_cash,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: RunRecordEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mark-to-market equity per entry: cash plus every recorded position
    /// valued at that entry's close.
    pub fn equity_series(&self) -> Vec<f64> {
        self.entries
            .iter()
            .map(|e| {
                let position_value: f64 =
                    e.positions.values().map(|qty| *qty as f64 * e.close).sum();
                e.cash + position_value
            })
            .collect()
    }

    /// Close price of the final entry, if any.
    pub fn last_close(&self) -> Option<f64> {
        self.entries.last().map(|e| e.close)
    }
}

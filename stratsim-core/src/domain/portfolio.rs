//! Portfolio ledger — cash plus per-symbol signed positions.
//!
//! Owns the cash/position consistency invariant: every fill debits cash by
//! exactly `signed_quantity × price`, so applying a fill and its reverse
//! restores the ledger bit-for-bit. Also hosts the risk operations that
//! read ledger state: risk-based position sizing, protective stop
//! construction, and portfolio CVaR.

use std::collections::HashMap;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use super::order::{Order, OrderError, OrderSide};
use crate::execution::{ExecutionHandler, SubmitOutcome};

/// Errors from ledger operations. Fatal to the step, never to the run.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("cannot size position: reference price {price} is not positive")]
    Sizing { price: f64 },

    #[error(transparent)]
    Execution(#[from] crate::execution::ExecutionError),
}

/// Aggregate portfolio state: cash and signed share counts.
///
/// Cash may go negative (margin). Positions default to zero on first
/// reference; zero means flat, sign indicates long/short. Mutated only by
/// fill events, exclusively owned by one backtest engine at a time.
#[derive(Debug, Clone)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_cash: f64,
    pub positions: HashMap<String, i64>,
}

impl Portfolio {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            cash: initial_cash,
            initial_cash,
            positions: HashMap::new(),
        }
    }

    /// Signed share count for a symbol; zero when flat or unknown.
    pub fn position(&self, symbol: &str) -> i64 {
        self.positions.get(symbol).copied().unwrap_or(0)
    }

    /// Whether a symbol has a non-flat position.
    pub fn has_position(&self, symbol: &str) -> bool {
        self.position(symbol) != 0
    }

    /// Apply a fill: add `signed_quantity` shares and debit
    /// `signed_quantity × price` from cash.
    pub fn update_position(&mut self, symbol: &str, signed_quantity: i64, price: f64) {
        *self.positions.entry(symbol.to_string()).or_insert(0) += signed_quantity;
        self.cash -= signed_quantity as f64 * price;
        debug!(
            symbol,
            signed_quantity,
            price,
            cash = self.cash,
            position = self.position(symbol),
            "position updated"
        );
    }

    /// Total equity: cash plus mark-to-market value of all positions.
    ///
    /// Symbols without a quoted price contribute nothing.
    pub fn equity(&self, prices: &HashMap<String, f64>) -> f64 {
        let position_value: f64 = self
            .positions
            .iter()
            .map(|(sym, qty)| *qty as f64 * prices.get(sym).copied().unwrap_or(0.0))
            .sum();
        self.cash + position_value
    }

    /// Validate and route an order through the execution interface, applying
    /// the resulting fill to the ledger.
    ///
    /// An invalid order fails before submission and a rejected or
    /// not-triggered order applies nothing — in every non-fill outcome the
    /// ledger is untouched.
    pub fn execute_order(
        &mut self,
        order: &Order,
        handler: &mut dyn ExecutionHandler,
    ) -> Result<SubmitOutcome, LedgerError> {
        if !order.validate() {
            return Err(LedgerError::Order(OrderError::Invalid {
                symbol: order.symbol.clone(),
                side: order.side,
                quantity: order.quantity,
                price: order.price,
            }));
        }
        let outcome = handler.submit(order)?;
        if let SubmitOutcome::Filled(fill) = &outcome {
            self.update_position(&fill.symbol, fill.signed_quantity(), fill.price);
        }
        Ok(outcome)
    }

    /// Build a protective stop that fully closes the current position.
    ///
    /// Returns `None` when flat. The stop price is derived from the current
    /// market price: a long position gets a sell stop at
    /// `last_price × (1 − stop_loss_percent)`, a short position a buy stop
    /// at `last_price × (1 + stop_loss_percent)`.
    pub fn stop_loss_order(
        &self,
        symbol: &str,
        last_price: f64,
        stop_loss_percent: f64,
        date: NaiveDate,
    ) -> Option<Order> {
        let position = self.position(symbol);
        if position == 0 {
            return None;
        }
        let (side, stop_price) = if position > 0 {
            (OrderSide::Sell, last_price * (1.0 - stop_loss_percent))
        } else {
            (OrderSide::Buy, last_price * (1.0 + stop_loss_percent))
        };
        Some(Order::stop(symbol, side, position.abs(), stop_price, date))
    }

    /// Risk-based position size: `floor(cash × risk_percent / last_price)`.
    ///
    /// Callers supply the current market price; sizing off anything else
    /// (the share count in particular) is a caller bug this signature makes
    /// impossible. Fails when the price is not positive.
    pub fn position_sizing(&self, last_price: f64, risk_percent: f64) -> Result<i64, LedgerError> {
        if !(last_price > 0.0) || !last_price.is_finite() {
            return Err(LedgerError::Sizing { price: last_price });
        }
        let risk_amount = self.cash * risk_percent;
        Ok((risk_amount / last_price).floor() as i64)
    }

    /// Conditional Value at Risk over the portfolio's trailing daily returns.
    ///
    /// For each held symbol, the trailing `window` daily percentage returns
    /// are scaled by the signed position and summed per day. VaR is the
    /// `(1 − confidence_level)` percentile of that series; CVaR is the mean
    /// of the returns strictly below it, reported as a positive loss
    /// magnitude. Returns `None` when no position has usable history or
    /// when the tail below VaR is empty — never NaN.
    pub fn calculate_cvar(
        &self,
        closes: &HashMap<String, Vec<f64>>,
        confidence_level: f64,
        window: usize,
    ) -> Option<f64> {
        let series = self.portfolio_returns(closes, window)?;
        let var = value_at_risk(&series, confidence_level)?;
        let tail: Vec<f64> = series.iter().copied().filter(|r| *r < var).collect();
        if tail.is_empty() {
            return None;
        }
        Some(-(tail.iter().sum::<f64>() / tail.len() as f64))
    }

    /// Position-scaled daily return series summed across held symbols.
    ///
    /// Series of unequal length are aligned from the most recent day
    /// backwards and truncated to the shortest. `None` when no held symbol
    /// has at least two closes.
    pub fn portfolio_returns(
        &self,
        closes: &HashMap<String, Vec<f64>>,
        window: usize,
    ) -> Option<Vec<f64>> {
        let mut per_symbol: Vec<Vec<f64>> = Vec::new();
        for (symbol, &position) in &self.positions {
            if position == 0 {
                continue;
            }
            let Some(series) = closes.get(symbol) else {
                continue;
            };
            let returns = pct_change(series);
            if returns.is_empty() {
                continue;
            }
            let start = returns.len().saturating_sub(window);
            per_symbol.push(
                returns[start..]
                    .iter()
                    .map(|r| r * position as f64)
                    .collect(),
            );
        }
        let len = per_symbol.iter().map(Vec::len).min()?;
        if len == 0 {
            return None;
        }
        let mut total = vec![0.0; len];
        for series in &per_symbol {
            let offset = series.len() - len;
            for (i, slot) in total.iter_mut().enumerate() {
                *slot += series[offset + i];
            }
        }
        Some(total)
    }
}

/// Day-over-day percentage change; one element shorter than the input.
pub fn pct_change(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .map(|w| if w[0] != 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

/// Value at Risk: the `(1 − confidence_level)` percentile of a return
/// series, linearly interpolated. `None` on an empty series.
pub fn value_at_risk(returns: &[f64], confidence_level: f64) -> Option<f64> {
    percentile(returns, 100.0 * (1.0 - confidence_level))
}

/// Linearly interpolated percentile over an unsorted slice.
fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let rank = (pct / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = rank - lo as f64;
    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

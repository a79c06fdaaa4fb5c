//! Order types: tagged variants, validity rules, trigger logic, and cost model.
//!
//! The three order kinds share one lifecycle per bar:
//! `Created → Validated → {Triggered → Filled | NotTriggered}`, with
//! `Validated → Rejected` when the invariant fails. Fills are atomic —
//! the full quantity or nothing. A non-market order that does not trigger
//! on the current bar is not retained; callers needing multi-bar pending
//! orders must track them externally.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bar::Bar;
use super::fill::Fill;

/// Default commission rate: linear in notional.
pub const DEFAULT_COMMISSION_RATE: f64 = 0.005;
/// Default slippage rate: linear in notional.
pub const DEFAULT_SLIPPAGE_RATE: f64 = 0.001;

/// Buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Wire-level side string expected by brokerage APIs.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

/// What kind of order and its trigger parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OrderKind {
    /// Fill immediately at the current price.
    Market,
    /// Fill at limit price or better.
    Limit { limit_price: f64 },
    /// Trigger when price reaches the stop level, then fill as market.
    Stop { stop_price: f64 },
}

impl OrderKind {
    /// Wire-level order-class string expected by brokerage APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderKind::Market => "market",
            OrderKind::Limit { .. } => "limit",
            OrderKind::Stop { .. } => "stop",
        }
    }
}

/// A trading instruction for a single symbol.
///
/// Immutable after submission; re-submission requires constructing a new
/// order. `price` is the reference price the order was sized against,
/// not necessarily the eventual fill price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: i64,
    pub price: f64,
    pub date: NaiveDate,
    pub kind: OrderKind,
}

/// Order failed its validity invariant. Fatal to the order, never to a run.
#[derive(Debug, Clone, Error)]
pub enum OrderError {
    #[error("invalid order: symbol={symbol:?} side={side:?} quantity={quantity} price={price}")]
    Invalid {
        symbol: String,
        side: OrderSide,
        quantity: i64,
        price: f64,
    },
}

impl Order {
    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: i64, price: f64, date: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            price,
            date,
            kind: OrderKind::Market,
        }
    }

    pub fn limit(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: i64,
        limit_price: f64,
        date: NaiveDate,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            price: limit_price,
            date,
            kind: OrderKind::Limit { limit_price },
        }
    }

    pub fn stop(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: i64,
        stop_price: f64,
        date: NaiveDate,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            quantity,
            price: stop_price,
            date,
            kind: OrderKind::Stop { stop_price },
        }
    }

    /// Validity invariant: non-empty symbol, positive quantity, positive
    /// finite reference price. Pure predicate, never panics.
    pub fn validate(&self) -> bool {
        !self.symbol.is_empty() && self.quantity > 0 && self.price > 0.0 && self.price.is_finite()
    }

    fn invalid(&self) -> OrderError {
        OrderError::Invalid {
            symbol: self.symbol.clone(),
            side: self.side,
            quantity: self.quantity,
            price: self.price,
        }
    }

    /// Notional value: quantity × reference price.
    pub fn total_cost(&self) -> f64 {
        self.quantity as f64 * self.price
    }

    /// Commission, linear in notional.
    pub fn commission_fee(&self, commission_rate: f64) -> f64 {
        self.total_cost() * commission_rate
    }

    /// Slippage cost, linear in notional.
    pub fn slippage_cost(&self, slippage_rate: f64) -> f64 {
        self.total_cost() * slippage_rate
    }

    /// Notional plus commission and slippage.
    pub fn total_cost_with_fees(&self, commission_rate: f64, slippage_rate: f64) -> f64 {
        self.total_cost() + self.commission_fee(commission_rate) + self.slippage_cost(slippage_rate)
    }

    /// Per-variant fill condition against a single bar.
    ///
    /// Market orders always trigger. A limit buy triggers when the bar
    /// trades down to the limit; a limit sell when it trades up to it.
    /// Stops are the mirror image: a buy stop triggers on the way up,
    /// a sell stop on the way down.
    pub fn should_trigger(&self, bar: &Bar) -> bool {
        match (&self.kind, self.side) {
            (OrderKind::Market, _) => true,
            (OrderKind::Limit { limit_price }, OrderSide::Buy) => bar.low <= *limit_price,
            (OrderKind::Limit { limit_price }, OrderSide::Sell) => bar.high >= *limit_price,
            (OrderKind::Stop { stop_price }, OrderSide::Buy) => bar.high >= *stop_price,
            (OrderKind::Stop { stop_price }, OrderSide::Sell) => bar.low <= *stop_price,
        }
    }

    /// Evaluate the order against one bar.
    ///
    /// Returns `Ok(Some(fill))` at the triggering price (market orders fill
    /// at the bar close, limit and stop orders at their trigger level),
    /// `Ok(None)` when the condition does not hold this bar, and
    /// `Err(OrderError::Invalid)` when the validity invariant fails.
    pub fn execute(&self, bar: &Bar) -> Result<Option<Fill>, OrderError> {
        if !self.validate() {
            return Err(self.invalid());
        }
        if !self.should_trigger(bar) {
            return Ok(None);
        }
        let fill_price = match &self.kind {
            OrderKind::Market => bar.close,
            OrderKind::Limit { limit_price } => *limit_price,
            OrderKind::Stop { stop_price } => *stop_price,
        };
        Ok(Some(Fill {
            symbol: self.symbol.clone(),
            side: self.side,
            quantity: self.quantity,
            price: fill_price,
            date: bar.date,
        }))
    }
}

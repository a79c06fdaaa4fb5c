//! Fill — the result of an order being matched.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::order::OrderSide;

/// An executed order: the full quantity matched at a single price.
///
/// Applied to the portfolio ledger by the caller; the fill itself carries
/// no ledger state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: i64,
    pub price: f64,
    pub date: NaiveDate,
}

impl Fill {
    /// Position delta: positive for buys, negative for sells.
    pub fn signed_quantity(&self) -> i64 {
        match self.side {
            OrderSide::Buy => self.quantity,
            OrderSide::Sell => -self.quantity,
        }
    }
}

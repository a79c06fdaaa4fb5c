//! Domain types: bars, orders, fills, and the portfolio ledger.

pub mod bar;
pub mod fill;
pub mod order;
pub mod portfolio;

pub use bar::Bar;
pub use fill::Fill;
pub use order::{
    Order, OrderError, OrderKind, OrderSide, DEFAULT_COMMISSION_RATE, DEFAULT_SLIPPAGE_RATE,
};
pub use portfolio::{pct_change, value_at_risk, LedgerError, Portfolio};

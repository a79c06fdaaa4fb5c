//! Execution interface — how orders leave the core.
//!
//! The engine and ledger never talk to a venue directly; they submit
//! through `ExecutionHandler` and consume the explicit per-order outcome.
//! `SimulatedExecution` is the backtest implementation; a live brokerage
//! adapter would implement the same trait over its API.

pub mod simulated;
pub mod wire;

use thiserror::Error;

use crate::domain::{Bar, Fill, Order};

pub use simulated::SimulatedExecution;
pub use wire::OrderTicket;

/// Execution interface failure: the submission or cancellation itself went
/// wrong (venue unavailable, no market data). Logged, step abandoned.
#[derive(Debug, Clone, Error)]
pub enum ExecutionError {
    #[error("order submission failed: {0}")]
    Submit(String),

    #[error("cancel failed for order {order_id}: {reason}")]
    Cancel { order_id: String, reason: String },
}

/// Outcome of a single submission, made explicit in the type system.
///
/// Distinct from `ExecutionError`: a rejection or an untriggered order is a
/// normal outcome the caller must handle, not an interface failure.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The full quantity matched at a single price.
    Filled(Fill),
    /// The trigger condition did not hold this bar; the order is not
    /// retained (single-bar contract).
    NotTriggered,
    /// The venue refused the order.
    Rejected { reason: String },
}

/// Narrow interface to an order-routing venue.
pub trait ExecutionHandler {
    /// Observe the current bar before submissions. Simulated handlers price
    /// fills from it; live handlers may ignore it.
    fn on_bar(&mut self, _bar: &Bar) {}

    /// Submit an order; time-in-force is always good-till-canceled.
    fn submit(&mut self, order: &Order) -> Result<SubmitOutcome, ExecutionError>;

    /// Cancel a previously submitted order by venue id.
    fn cancel(&mut self, order_id: &str) -> Result<(), ExecutionError>;
}

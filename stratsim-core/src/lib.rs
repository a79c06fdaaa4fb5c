//! StratSim Core — domain types, execution, signals, and the backtest engine.
//!
//! This crate contains the heart of the simulator:
//! - Domain types (bars, orders, fills, the portfolio ledger)
//! - Transaction cost model (commission + slippage) and risk sizing
//! - Historical CVaR over the trailing return window
//! - Execution handler trait with a simulated venue
//! - Signal source trait with a moving-average crossover strategy
//! - Sequential bar-by-bar engine producing an auditable run record

pub mod data;
pub mod domain;
pub mod engine;
pub mod execution;
pub mod signal;

//! StratSim Runner — backtest orchestration and analysis.
//!
//! This crate builds on `stratsim-core` to provide:
//! - Serializable run configuration with validation (TOML)
//! - Single-backtest runner wiring feed, strategy, venue, and engine
//! - Performance analysis (returns, Sharpe, drawdown, Calmar, alpha/beta)
//! - JSON and CSV artifact export
//! - Seeded synthetic bar generation for tests

pub mod config;
pub mod export;
pub mod report;
pub mod runner;
pub mod synthetic;

pub use config::{BacktestConfig, ConfigError};
pub use export::{export_json, export_record_csv, import_json, write_record_csv};
pub use report::PerformanceReport;
pub use runner::{run_backtest, run_backtest_with_feed, BacktestResult, RunError};
pub use synthetic::{synthetic_bars, trending_bars};

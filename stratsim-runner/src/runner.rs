//! Single-backtest orchestration: wire a bar feed, a strategy, and a
//! simulated venue into an engine, run it, and analyze the record.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use stratsim_core::data::{BarFeed, DataError, InMemoryFeed};
use stratsim_core::domain::Bar;
use stratsim_core::engine::{Backtester, RunRecord};
use stratsim_core::execution::SimulatedExecution;
use stratsim_core::signal::MaCrossover;

use crate::config::{BacktestConfig, ConfigError};
use crate::report::PerformanceReport;

/// Everything a finished run produces: the reproducing config, the full
/// audit trail, and the derived metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub config: BacktestConfig,
    pub record: RunRecord,
    pub report: PerformanceReport,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("data source failed: {source}")]
    Data {
        source: DataError,
        /// Audit trail of the bars processed before the failure.
        record: RunRecord,
    },
}

/// Run one backtest over an in-memory bar history.
///
/// `benchmark_closes`, when given, should cover the same bars as `bars`;
/// it feeds the alpha/beta regression and nothing else.
pub fn run_backtest(
    config: &BacktestConfig,
    bars: Vec<Bar>,
    benchmark_closes: Option<&[f64]>,
) -> Result<BacktestResult, RunError> {
    let feed = InMemoryFeed::new(config.symbol.clone(), bars);
    run_backtest_with_feed(config, Box::new(feed), benchmark_closes)
}

/// Run one backtest over any bar feed.
///
/// When the feed fails mid-run the error carries the partial run record,
/// so callers on fallible sources keep the audit trail up to the failure.
pub fn run_backtest_with_feed(
    config: &BacktestConfig,
    feed: Box<dyn BarFeed>,
    benchmark_closes: Option<&[f64]>,
) -> Result<BacktestResult, RunError> {
    config.validate()?;

    let strategy = MaCrossover::new(config.short_window, config.long_window);
    let execution = SimulatedExecution::with_default_costs();

    let mut engine = Backtester::new(
        config.engine_config(),
        feed,
        Box::new(strategy),
        Box::new(execution),
    );
    if let Err(source) = engine.run() {
        return Err(RunError::Data {
            source,
            record: engine.into_record(),
        });
    }

    let record = engine.into_record();
    let report = PerformanceReport::compute(&record, benchmark_closes);
    info!(
        symbol = %config.symbol,
        bars = record.len(),
        total_return = report.total_return,
        "run complete"
    );

    Ok(BacktestResult {
        config: config.clone(),
        record,
        report,
    })
}

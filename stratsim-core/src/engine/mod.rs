//! Backtest engine — the sequential signal → order → fill → record loop.
//!
//! One step per bar, fully ordered: fetch → signal → size → order → fill →
//! record. Per-step failures are isolated as `StepOutcome::Skipped` and
//! logged; only a data source failure terminates the run, and the run
//! record accumulated up to that point stays usable. The portfolio is
//! exclusively owned by one engine; concurrent backtests each construct
//! their own engine, ledger, and record.

pub mod record;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::data::{BarFeed, DataError};
use crate::domain::{Bar, LedgerError, Order, OrderSide, Portfolio};
use crate::execution::{ExecutionHandler, SubmitOutcome};
use crate::signal::{Signal, SignalError, SignalSource};

pub use record::{RunRecord, RunRecordEntry};

/// Engine parameters.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub symbol: String,
    pub initial_cash: f64,
    /// Fraction of cash risked per entry.
    pub risk_percent: f64,
    /// Protective stop distance as a fraction of the entry price.
    pub stop_loss_percent: f64,
}

impl EngineConfig {
    pub fn new(symbol: impl Into<String>, initial_cash: f64) -> Self {
        Self {
            symbol: symbol.into(),
            initial_cash,
            risk_percent: 0.01,
            stop_loss_percent: 0.05,
        }
    }
}

/// A per-step failure. Isolated and logged, never fatal to the run.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Signal(#[from] SignalError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// How a single step resolved.
#[derive(Debug)]
pub enum StepOutcome {
    /// An entry or exit order was submitted this step.
    Traded(Order),
    /// No action was called for.
    Idle,
    /// The step failed and was abandoned; the ledger is unchanged by it.
    Skipped(StepError),
}

/// Drives a single backtest over a chronologically ordered bar feed.
///
/// Not restartable: run-once, then read the record. A fresh engine is
/// constructed per run.
pub struct Backtester {
    config: EngineConfig,
    feed: Box<dyn BarFeed>,
    strategy: Box<dyn SignalSource>,
    execution: Box<dyn ExecutionHandler>,
    portfolio: Portfolio,
    record: RunRecord,
    closes: Vec<f64>,
}

impl Backtester {
    pub fn new(
        config: EngineConfig,
        feed: Box<dyn BarFeed>,
        strategy: Box<dyn SignalSource>,
        execution: Box<dyn ExecutionHandler>,
    ) -> Self {
        let portfolio = Portfolio::new(config.initial_cash);
        let record = RunRecord::new(config.symbol.clone(), config.initial_cash);
        Self {
            config,
            feed,
            strategy,
            execution,
            portfolio,
            record,
            closes: Vec::new(),
        }
    }

    /// Run to data-source exhaustion.
    ///
    /// Returns the data error that aborted the run, if any; the partial
    /// record remains accessible either way.
    pub fn run(&mut self) -> Result<(), DataError> {
        info!(
            symbol = %self.config.symbol,
            strategy = self.strategy.name(),
            initial_cash = self.config.initial_cash,
            "backtest started"
        );
        loop {
            let bar = match self.feed.next_bar() {
                Ok(Some(bar)) => bar,
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, bars = self.record.len(), "data source failed, aborting run");
                    return Err(e);
                }
            };
            self.process_bar(bar);
        }
        info!(
            bars = self.record.len(),
            final_cash = self.portfolio.cash,
            "backtest completed"
        );
        Ok(())
    }

    fn process_bar(&mut self, bar: Bar) {
        debug!(date = %bar.date, close = bar.close, "processing bar");
        self.execution.on_bar(&bar);
        self.closes.push(bar.close);

        let (signal, signal_failure) = match self.strategy.current(&self.closes) {
            Ok(signal) => (signal, None),
            Err(e) => {
                warn!(error = %e, date = %bar.date, "signal source failed, skipping step");
                (Signal::Flat, Some(e))
            }
        };
        debug!(date = %bar.date, signal = signal.value(), "signal");

        let outcome = match signal_failure {
            Some(e) => StepOutcome::Skipped(e.into()),
            None => match signal {
                Signal::Long => match self.enter_long(&bar) {
                    Ok(order) => StepOutcome::Traded(order),
                    Err(e) => {
                        warn!(error = %e, date = %bar.date, "buy step abandoned");
                        StepOutcome::Skipped(e)
                    }
                },
                Signal::Short => match self.exit_long(&bar) {
                    Ok(Some(order)) => StepOutcome::Traded(order),
                    Ok(None) => StepOutcome::Idle,
                    Err(e) => {
                        warn!(error = %e, date = %bar.date, "sell step abandoned");
                        StepOutcome::Skipped(e)
                    }
                },
                Signal::Flat => StepOutcome::Idle,
            },
        };

        // One entry per processed bar, whatever the branch outcome.
        let order = match &outcome {
            StepOutcome::Traded(order) => Some(order.clone()),
            _ => None,
        };
        self.record.push(RunRecordEntry {
            date: bar.date,
            signal,
            order,
            cash: self.portfolio.cash,
            positions: self.portfolio.positions.clone(),
            close: bar.close,
        });
    }

    /// Buy branch: size by risk, submit a market buy, then issue the
    /// protective stop for the resulting position.
    fn enter_long(&mut self, bar: &Bar) -> Result<Order, StepError> {
        let quantity = self.portfolio.position_sizing(bar.close, self.config.risk_percent)?;
        let order = Order::market(
            self.config.symbol.clone(),
            OrderSide::Buy,
            quantity,
            bar.close,
            bar.date,
        );
        let outcome = self.portfolio.execute_order(&order, &mut *self.execution)?;
        match &outcome {
            SubmitOutcome::Filled(fill) => {
                info!(date = %bar.date, quantity = fill.quantity, price = fill.price, "entry filled");
            }
            SubmitOutcome::Rejected { reason } => {
                warn!(date = %bar.date, reason, "entry rejected");
            }
            SubmitOutcome::NotTriggered => {}
        }

        if let Some(stop) =
            self.portfolio
                .stop_loss_order(&self.config.symbol, bar.close, self.config.stop_loss_percent, bar.date)
        {
            let stop_price = stop.price;
            match self.portfolio.execute_order(&stop, &mut *self.execution)? {
                SubmitOutcome::Filled(fill) => {
                    info!(date = %bar.date, price = fill.price, "protective stop filled within bar");
                }
                SubmitOutcome::NotTriggered => {
                    debug!(date = %bar.date, stop_price, "protective stop not triggered, not retained");
                }
                SubmitOutcome::Rejected { reason } => {
                    warn!(date = %bar.date, reason, "protective stop rejected");
                }
            }
        }
        Ok(order)
    }

    /// Sell branch: close the full long position, if one exists.
    fn exit_long(&mut self, bar: &Bar) -> Result<Option<Order>, StepError> {
        let position = self.portfolio.position(&self.config.symbol);
        if position <= 0 {
            return Ok(None);
        }
        let order = Order::market(
            self.config.symbol.clone(),
            OrderSide::Sell,
            position,
            bar.close,
            bar.date,
        );
        let outcome = self.portfolio.execute_order(&order, &mut *self.execution)?;
        match &outcome {
            SubmitOutcome::Filled(fill) => {
                info!(date = %bar.date, quantity = fill.quantity, price = fill.price, "exit filled");
            }
            SubmitOutcome::Rejected { reason } => {
                warn!(date = %bar.date, reason, "exit rejected");
            }
            SubmitOutcome::NotTriggered => {}
        }
        Ok(Some(order))
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn record(&self) -> &RunRecord {
        &self.record
    }

    /// Consume the engine, keeping only its audit trail.
    pub fn into_record(self) -> RunRecord {
        self.record
    }
}

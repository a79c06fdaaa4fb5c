//! Simulated execution — fills orders against the current bar.

use tracing::{debug, warn};

use crate::domain::{Bar, Order, DEFAULT_COMMISSION_RATE, DEFAULT_SLIPPAGE_RATE};

use super::{ExecutionError, ExecutionHandler, OrderTicket, SubmitOutcome};

/// Backtest execution handler.
///
/// Prices fills from the most recent bar seen via `on_bar` and accumulates
/// linear-in-notional commission and slippage for every fill. Submitting
/// before any bar has arrived is an interface failure.
#[derive(Debug, Clone)]
pub struct SimulatedExecution {
    commission_rate: f64,
    slippage_rate: f64,
    current_bar: Option<Bar>,
    total_commission: f64,
    total_slippage: f64,
    fills: usize,
}

impl SimulatedExecution {
    pub fn new(commission_rate: f64, slippage_rate: f64) -> Self {
        Self {
            commission_rate,
            slippage_rate,
            current_bar: None,
            total_commission: 0.0,
            total_slippage: 0.0,
            fills: 0,
        }
    }

    /// Default linear cost rates.
    pub fn with_default_costs() -> Self {
        Self::new(DEFAULT_COMMISSION_RATE, DEFAULT_SLIPPAGE_RATE)
    }

    /// No execution friction at all.
    pub fn frictionless() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn total_commission(&self) -> f64 {
        self.total_commission
    }

    pub fn total_slippage(&self) -> f64 {
        self.total_slippage
    }

    pub fn fill_count(&self) -> usize {
        self.fills
    }
}

impl ExecutionHandler for SimulatedExecution {
    fn on_bar(&mut self, bar: &Bar) {
        self.current_bar = Some(bar.clone());
    }

    fn submit(&mut self, order: &Order) -> Result<SubmitOutcome, ExecutionError> {
        let bar = self
            .current_bar
            .as_ref()
            .ok_or_else(|| ExecutionError::Submit("no market data available".into()))?;

        let ticket = OrderTicket::from(order);
        debug!(?ticket, "submitting order");

        match order.execute(bar) {
            Ok(Some(fill)) => {
                self.total_commission += order.commission_fee(self.commission_rate);
                self.total_slippage += order.slippage_cost(self.slippage_rate);
                self.fills += 1;
                debug!(
                    symbol = %fill.symbol,
                    side = ticket.side,
                    quantity = fill.quantity,
                    price = fill.price,
                    "order filled"
                );
                Ok(SubmitOutcome::Filled(fill))
            }
            Ok(None) => {
                debug!(
                    symbol = %order.symbol,
                    order_class = ticket.order_class,
                    "order not triggered this bar"
                );
                Ok(SubmitOutcome::NotTriggered)
            }
            Err(e) => {
                warn!(error = %e, "order rejected");
                Ok(SubmitOutcome::Rejected {
                    reason: e.to_string(),
                })
            }
        }
    }

    fn cancel(&mut self, order_id: &str) -> Result<(), ExecutionError> {
        // Simulated orders never rest across bars, so there is nothing to
        // cancel; acknowledge for interface parity with a live venue.
        debug!(order_id, "cancel acknowledged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderSide;
    use chrono::NaiveDate;

    fn bar(open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            symbol: "SPY".into(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open,
            high,
            low,
            close,
            volume: 10_000,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    #[test]
    fn submit_without_bar_is_an_interface_failure() {
        let mut exec = SimulatedExecution::frictionless();
        let order = Order::market("SPY", OrderSide::Buy, 100, 100.0, date());
        assert!(matches!(
            exec.submit(&order),
            Err(ExecutionError::Submit(_))
        ));
    }

    #[test]
    fn market_order_fills_at_close() {
        let mut exec = SimulatedExecution::frictionless();
        exec.on_bar(&bar(100.0, 105.0, 98.0, 103.0));
        let order = Order::market("SPY", OrderSide::Buy, 100, 100.0, date());
        match exec.submit(&order).unwrap() {
            SubmitOutcome::Filled(fill) => assert_eq!(fill.price, 103.0),
            other => panic!("expected fill, got {other:?}"),
        }
        assert_eq!(exec.fill_count(), 1);
    }

    #[test]
    fn untriggered_stop_reports_not_triggered() {
        let mut exec = SimulatedExecution::frictionless();
        exec.on_bar(&bar(100.0, 105.0, 98.0, 103.0));
        let order = Order::stop("SPY", OrderSide::Sell, 100, 90.0, date());
        assert_eq!(exec.submit(&order).unwrap(), SubmitOutcome::NotTriggered);
        assert_eq!(exec.fill_count(), 0);
    }

    #[test]
    fn invalid_order_is_rejected_not_an_error() {
        let mut exec = SimulatedExecution::frictionless();
        exec.on_bar(&bar(100.0, 105.0, 98.0, 103.0));
        let order = Order::market("SPY", OrderSide::Buy, 0, 100.0, date());
        assert!(matches!(
            exec.submit(&order).unwrap(),
            SubmitOutcome::Rejected { .. }
        ));
    }

    #[test]
    fn fees_accumulate_per_fill() {
        let mut exec = SimulatedExecution::with_default_costs();
        exec.on_bar(&bar(100.0, 105.0, 98.0, 100.0));
        let order = Order::market("SPY", OrderSide::Buy, 100, 100.0, date());
        exec.submit(&order).unwrap();
        // notional 10_000: commission 50, slippage 10
        assert!((exec.total_commission() - 50.0).abs() < 1e-10);
        assert!((exec.total_slippage() - 10.0).abs() < 1e-10);
    }

    #[test]
    fn cancel_is_acknowledged() {
        let mut exec = SimulatedExecution::frictionless();
        assert!(exec.cancel("abc-123").is_ok());
    }
}

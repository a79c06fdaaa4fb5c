//! Performance analysis — pure functions over a finished run record.
//!
//! Every metric is computed from the record's equity series; nothing here
//! touches the engine or the data layer. Metrics that are undefined for a
//! given run (zero-variance returns, zero drawdown, degenerate benchmark)
//! are `None`, never NaN and never a crash.

use serde::{Deserialize, Serialize};
use stratsim_core::engine::RunRecord;

/// Trading days per year, used for annualization throughout.
const TRADING_DAYS: f64 = 252.0;

/// Aggregate performance metrics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// (final equity − initial) / initial.
    pub total_return: f64,

    /// Total return compounded to a 252-day year.
    pub annualized_return: f64,

    /// Annualized Sharpe ratio; `None` when return variance is zero.
    pub sharpe: Option<f64>,

    /// Deepest peak-to-trough decline of cumulative returns, as a
    /// non-negative fraction.
    pub max_drawdown: f64,

    /// Annualized return over max drawdown; `None` when drawdown is zero.
    pub calmar: Option<f64>,

    /// Annualized OLS intercept of daily returns on the benchmark's;
    /// `None` without a usable benchmark.
    pub alpha: Option<f64>,

    /// OLS slope of daily returns on the benchmark's; `None` without a
    /// usable benchmark.
    pub beta: Option<f64>,

    /// Bars the run processed.
    pub bar_count: usize,
}

impl PerformanceReport {
    /// Compute all metrics from a run record, optionally regressing against
    /// a benchmark close series covering the same bars.
    pub fn compute(record: &RunRecord, benchmark_closes: Option<&[f64]>) -> Self {
        let mut equity = vec![record.initial_cash];
        equity.extend(record.equity_series());
        let returns = daily_returns(&equity);

        let total_return = if record.initial_cash > 0.0 {
            (equity.last().copied().unwrap_or(record.initial_cash) - record.initial_cash)
                / record.initial_cash
        } else {
            0.0
        };
        let annualized_return = annualize(total_return, record.len());
        let max_drawdown = max_drawdown(&returns);

        let (alpha, beta) = match benchmark_closes {
            Some(closes) => regress_against(&returns, closes),
            None => (None, None),
        };

        Self {
            total_return,
            annualized_return,
            sharpe: sharpe_ratio(&returns),
            max_drawdown,
            calmar: (max_drawdown > 0.0).then(|| annualized_return / max_drawdown),
            alpha,
            beta,
            bar_count: record.len(),
        }
    }
}

/// Period-over-period fractional change; one element shorter than the input.
fn daily_returns(equity: &[f64]) -> Vec<f64> {
    equity
        .windows(2)
        .map(|w| if w[0] != 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

/// Compound a whole-run return to a 252-day year.
fn annualize(total_return: f64, bars: usize) -> f64 {
    if bars == 0 || total_return <= -1.0 {
        return 0.0;
    }
    (1.0 + total_return).powf(TRADING_DAYS / bars as f64) - 1.0
}

/// Annualized Sharpe: `√252 × mean / std` over daily returns.
fn sharpe_ratio(returns: &[f64]) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }
    let std = std_dev(returns);
    if std < 1e-12 {
        return None;
    }
    Some(TRADING_DAYS.sqrt() * mean(returns) / std)
}

/// Deepest decline of the cumulative return path from its running peak.
fn max_drawdown(returns: &[f64]) -> f64 {
    let mut cumulative = 0.0;
    let mut peak = 0.0_f64;
    let mut worst = 0.0_f64;
    for r in returns {
        cumulative += r;
        peak = peak.max(cumulative);
        worst = worst.max(peak - cumulative);
    }
    worst
}

/// OLS of run returns on benchmark returns, aligned from the most recent
/// observation backwards. `(alpha, beta)` with alpha annualized; both
/// `None` when the overlap is too short or the benchmark never moves.
fn regress_against(returns: &[f64], benchmark_closes: &[f64]) -> (Option<f64>, Option<f64>) {
    let bench = daily_returns(benchmark_closes);
    let n = returns.len().min(bench.len());
    if n < 2 {
        return (None, None);
    }
    let y = &returns[returns.len() - n..];
    let x = &bench[bench.len() - n..];

    let x_mean = mean(x);
    let y_mean = mean(y);
    let mut covariance = 0.0;
    let mut x_variance = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        covariance += (xi - x_mean) * (yi - y_mean);
        x_variance += (xi - x_mean).powi(2);
    }
    if x_variance < 1e-18 {
        return (None, None);
    }
    let beta = covariance / x_variance;
    let intercept = y_mean - beta * x_mean;
    (Some(intercept * TRADING_DAYS.sqrt()), Some(beta))
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n − 1 denominator).
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use stratsim_core::engine::RunRecordEntry;
    use stratsim_core::signal::Signal;

    fn record_from_equity(cash_path: &[f64]) -> RunRecord {
        // Cash-only record: no positions, so equity == cash.
        let mut record = RunRecord::new("SPY", cash_path[0]);
        for (i, &cash) in cash_path.iter().enumerate().skip(1) {
            record.push(RunRecordEntry {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
                    + chrono::Duration::days(i as i64),
                signal: Signal::Flat,
                order: None,
                cash,
                positions: HashMap::new(),
                close: 100.0,
            });
        }
        record
    }

    #[test]
    fn total_return_from_endpoints() {
        let record = record_from_equity(&[100_000.0, 101_000.0, 110_000.0]);
        let report = PerformanceReport::compute(&record, None);
        assert!((report.total_return - 0.10).abs() < 1e-12);
        assert_eq!(report.bar_count, 2);
    }

    #[test]
    fn flat_equity_has_no_sharpe_and_no_calmar() {
        let record = record_from_equity(&[100_000.0; 10]);
        let report = PerformanceReport::compute(&record, None);
        assert_eq!(report.total_return, 0.0);
        assert_eq!(report.sharpe, None);
        assert_eq!(report.max_drawdown, 0.0);
        assert_eq!(report.calmar, None);
    }

    #[test]
    fn drawdown_measures_peak_to_trough() {
        // +10% then -10% then -10%: cumulative path 0.10, 0.0, -0.10;
        // peak 0.10, trough -0.10 → drawdown 0.20.
        let record = record_from_equity(&[100.0, 110.0, 99.0, 89.1]);
        let report = PerformanceReport::compute(&record, None);
        assert!((report.max_drawdown - 0.20).abs() < 1e-9);
        assert!(report.calmar.is_some());
    }

    #[test]
    fn monotone_equity_has_zero_drawdown() {
        let record = record_from_equity(&[100.0, 101.0, 102.0, 103.0]);
        let report = PerformanceReport::compute(&record, None);
        assert_eq!(report.max_drawdown, 0.0);
        assert_eq!(report.calmar, None);
        assert!(report.sharpe.unwrap() > 0.0);
    }

    #[test]
    fn beta_of_benchmark_against_itself_is_one() {
        // Equity tracks the benchmark exactly → beta 1, alpha 0.
        let closes = [100.0, 102.0, 101.0, 104.0, 103.0, 106.0];
        let cash: Vec<f64> = closes.iter().map(|c| c * 1_000.0).collect();
        let record = record_from_equity(&cash);
        let report = PerformanceReport::compute(&record, Some(&closes));
        let beta = report.beta.unwrap();
        let alpha = report.alpha.unwrap();
        assert!((beta - 1.0).abs() < 1e-9);
        assert!(alpha.abs() < 1e-9);
    }

    #[test]
    fn constant_benchmark_yields_no_regression() {
        let record = record_from_equity(&[100.0, 101.0, 103.0, 102.0]);
        let report = PerformanceReport::compute(&record, Some(&[50.0, 50.0, 50.0, 50.0]));
        assert_eq!(report.alpha, None);
        assert_eq!(report.beta, None);
    }

    #[test]
    fn annualization_compounds_by_bar_count() {
        // 10% over 252 bars annualizes to exactly 10%.
        let mut cash = vec![100_000.0];
        let step = (1.1_f64).powf(1.0 / 252.0);
        for i in 1..=252 {
            cash.push(100_000.0 * step.powi(i));
        }
        let record = record_from_equity(&cash);
        let report = PerformanceReport::compute(&record, None);
        assert!((report.annualized_return - 0.10).abs() < 1e-9);
    }
}

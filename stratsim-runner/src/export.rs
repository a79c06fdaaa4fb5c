//! Run artifact export — JSON results and the run record as CSV.
//!
//! Persistence stays the caller's concern: the string builders here never
//! touch the filesystem, and the `write_*` helpers take an explicit path.

use std::path::Path;

use anyhow::{Context, Result};

use stratsim_core::engine::RunRecord;

use crate::runner::BacktestResult;

/// Serialize a finished run to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a run previously exported with [`export_json`].
pub fn import_json(json: &str) -> Result<BacktestResult> {
    serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")
}

/// Render the run record as CSV, one row per bar.
///
/// Columns: date, close, signal, order_side, order_quantity, order_price,
/// cash, position, equity.
pub fn export_record_csv(record: &RunRecord) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "close",
        "signal",
        "order_side",
        "order_quantity",
        "order_price",
        "cash",
        "position",
        "equity",
    ])
    .context("failed to write CSV header")?;

    let equity = record.equity_series();
    for (entry, eq) in record.entries.iter().zip(equity) {
        let (side, quantity, price) = match &entry.order {
            Some(order) => (
                order.side.as_str().to_string(),
                order.quantity.to_string(),
                format!("{:.4}", order.price),
            ),
            None => (String::new(), String::new(), String::new()),
        };
        let position = entry.positions.get(&record.symbol).copied().unwrap_or(0);
        wtr.write_record([
            entry.date.to_string(),
            format!("{:.4}", entry.close),
            entry.signal.value().to_string(),
            side,
            quantity,
            price,
            format!("{:.2}", entry.cash),
            position.to_string(),
            format!("{:.2}", eq),
        ])
        .with_context(|| format!("failed to write CSV row for {}", entry.date))?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

/// Write the run record CSV to a file.
pub fn write_record_csv(record: &RunRecord, path: &Path) -> Result<()> {
    let csv = export_record_csv(record)?;
    std::fs::write(path, csv)
        .with_context(|| format!("failed to write run record to {}", path.display()))
}

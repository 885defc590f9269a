//! Per-row CSV dump of a monitor frame.

use anyhow::{Context, Result};
use std::path::Path;

use crate::runner::MonitorFrame;

fn fmt_value(v: f64) -> String {
    format!("{v:.6}")
}

/// One row per date: filled prices, composite change and cumulative,
/// leader cumulative, spread, slope (empty until the window fills).
pub fn export_frame_csv(frame: &MonitorFrame) -> Result<String> {
    let table = &frame.table;
    let ids: Vec<_> = table.instruments().cloned().collect();

    let mut wtr = csv::Writer::from_writer(Vec::new());
    let mut header: Vec<String> = vec!["date".to_string()];
    header.extend(ids.iter().map(|id| id.to_string()));
    header.extend(
        [
            "cost_change",
            "cost_cumulative",
            "leader_cumulative",
            "spread",
            "slope",
        ]
        .map(String::from),
    );
    wtr.write_record(&header)?;

    for (row, date) in table.dates().iter().enumerate() {
        let mut record = vec![date.to_string()];
        for id in &ids {
            let v = table.filled(id).and_then(|c| c.get(row)).copied();
            record.push(v.map(fmt_value).unwrap_or_default());
        }
        record.push(fmt_value(frame.cost.change[row]));
        record.push(fmt_value(frame.cost.cumulative[row]));
        record.push(fmt_value(frame.spread.leader_cumulative[row]));
        record.push(fmt_value(frame.spread.values[row]));
        record.push(
            frame
                .slope
                .values
                .get(row)
                .copied()
                .flatten()
                .map(fmt_value)
                .unwrap_or_default(),
        );
        wtr.write_record(&record)?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

pub fn write_frame_csv(path: &Path, frame: &MonitorFrame) -> Result<()> {
    let csv = export_frame_csv(frame)?;
    std::fs::write(path, csv).with_context(|| format!("Failed to write CSV {}", path.display()))
}

//! Latest genuinely observed value per instrument.
//!
//! Reads the raw view only, so a forward-filled row can never be reported
//! as a fresh observation.

use chrono::NaiveDate;
use serde::Serialize;

use crate::data::AlignedTable;
use crate::domain::InstrumentId;

/// Most recent observation and its change versus the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatestObservation {
    pub value: f64,
    /// Percent (not fraction) change versus the previous observation.
    pub change_pct: f64,
    pub date: NaiveDate,
    /// True when `date` is the run's invocation date.
    pub is_current: bool,
}

/// Scan the raw column backward for the last two observations.
///
/// Returns `None` when the instrument is absent or has fewer than two
/// observations; callers render that as "no data".
pub fn resolve_latest(
    table: &AlignedTable,
    id: &InstrumentId,
    as_of: NaiveDate,
) -> Option<LatestObservation> {
    let column = table.raw(id)?;
    let mut observed = table
        .dates()
        .iter()
        .zip(column)
        .rev()
        .filter_map(|(date, v)| v.map(|v| (*date, v)));

    let (date, value) = observed.next()?;
    let (_, previous) = observed.next()?;

    let change_pct = if previous == 0.0 {
        0.0
    } else {
        (value - previous) / previous * 100.0
    };

    Some(LatestObservation {
        value,
        change_pct,
        date,
        is_current: date == as_of,
    })
}

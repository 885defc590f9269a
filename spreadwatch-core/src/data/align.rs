//! Multi-instrument time alignment.
//!
//! Given closing prices for several instruments traded on different national
//! calendars, align them to the union of their dates. Two views are kept:
//! the raw view leaves gaps as `None`; the filled view forward-fills gaps
//! (back-filling the leading gap) so percent changes are always defined.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

use super::provider::{DataError, PriceTable};
use crate::domain::InstrumentId;

/// Prices for several instruments on a common ascending date index.
///
/// Each column in `raw` and `filled` has the same length as `dates`. The two
/// views are built once and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedTable {
    dates: Vec<NaiveDate>,
    raw: BTreeMap<InstrumentId, Vec<Option<f64>>>,
    filled: BTreeMap<InstrumentId, Vec<f64>>,
}

impl AlignedTable {
    /// The common date axis (sorted ascending).
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Instruments present in the table, in id order.
    pub fn instruments(&self) -> impl Iterator<Item = &InstrumentId> {
        self.raw.keys()
    }

    /// As-observed column: `None` where the instrument did not trade.
    pub fn raw(&self, id: &InstrumentId) -> Option<&[Option<f64>]> {
        self.raw.get(id).map(Vec::as_slice)
    }

    /// Forward-filled column with no gaps.
    pub fn filled(&self, id: &InstrumentId) -> Option<&[f64]> {
        self.filled.get(id).map(Vec::as_slice)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Fraction of rows in the raw view that are gaps, per instrument.
    pub fn gap_rates(&self) -> BTreeMap<InstrumentId, f64> {
        let n = self.dates.len().max(1) as f64;
        self.raw
            .iter()
            .map(|(id, col)| {
                let gaps = col.iter().filter(|v| v.is_none()).count();
                (id.clone(), gaps as f64 / n)
            })
            .collect()
    }
}

/// Align all instruments in `table` to the union of their dates.
///
/// Fails with `DataUnavailable` only when no instrument has a single
/// observation. An instrument with an empty series still gets a column:
/// all `None` in the raw view and all `0.0` in the filled view.
pub fn align_series(table: &PriceTable) -> Result<AlignedTable, DataError> {
    let dates: Vec<NaiveDate> = table
        .values()
        .flat_map(|series| series.keys().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    if dates.is_empty() {
        return Err(DataError::DataUnavailable);
    }

    let mut raw = BTreeMap::new();
    let mut filled = BTreeMap::new();

    for (id, series) in table {
        let column: Vec<Option<f64>> = dates.iter().map(|d| series.get(d).copied()).collect();
        filled.insert(id.clone(), fill_column(&column));
        raw.insert(id.clone(), column);
    }

    Ok(AlignedTable { dates, raw, filled })
}

/// Forward-fill gaps; rows before the first observation take that observation.
fn fill_column(column: &[Option<f64>]) -> Vec<f64> {
    let Some(first) = column.iter().flatten().next().copied() else {
        return vec![0.0; column.len()];
    };

    let mut last = first;
    column
        .iter()
        .map(|v| {
            if let Some(v) = v {
                last = *v;
            }
            last
        })
        .collect()
}

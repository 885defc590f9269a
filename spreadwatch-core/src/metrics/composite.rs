//! Composite cost index.
//!
//! change[t] = w_primary * r_primary[t] + w_secondary * r_secondary[t] + w_fx * r_fx[t]
//! cumulative = cumulate(change)
//!
//! Inputs are the filled view. A cost factor missing from the table
//! contributes a zero change on every row.

use super::returns::{cumulate, pct_changes, Cumulation};
use crate::data::AlignedTable;
use crate::domain::{CostFactors, CostWeights, InstrumentId};

/// Weighted cost change per row and its cumulative drift.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeCostIndex {
    pub change: Vec<f64>,
    pub cumulative: Vec<f64>,
}

impl CompositeCostIndex {
    pub fn latest_change(&self) -> Option<f64> {
        self.change.last().copied()
    }

    pub fn latest_cumulative(&self) -> Option<f64> {
        self.cumulative.last().copied()
    }
}

/// Daily returns of one filled column, or zeros if the column is absent.
pub(crate) fn column_returns(table: &AlignedTable, id: &InstrumentId) -> Vec<f64> {
    table
        .filled(id)
        .map(pct_changes)
        .unwrap_or_else(|| vec![0.0; table.len()])
}

pub fn composite_cost_index(
    table: &AlignedTable,
    factors: &CostFactors,
    weights: &CostWeights,
    mode: Cumulation,
) -> CompositeCostIndex {
    let primary = column_returns(table, &factors.primary);
    let secondary = column_returns(table, &factors.secondary);
    let fx = column_returns(table, &factors.fx);

    let change: Vec<f64> = (0..table.len())
        .map(|t| weights.primary * primary[t] + weights.secondary * secondary[t] + weights.fx * fx[t])
        .collect();
    let cumulative = cumulate(&change, mode);

    CompositeCostIndex { change, cumulative }
}

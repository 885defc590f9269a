//! Profit spread and its slope.
//!
//! spread[t] = leader_cum[t] - cost_cum[t]
//! slope[t]  = spread[t] - spread[t-N]   (absent for t < N)
//!
//! Both cumulative terms start at zero, so spread[0] == 0 on every run.

use super::composite::{column_returns, CompositeCostIndex};
use super::returns::{cumulate, Cumulation};
use crate::data::AlignedTable;
use crate::domain::InstrumentId;

/// Default slope window in trading rows.
pub const DEFAULT_SLOPE_WINDOW: usize = 5;

/// Leader's cumulative return minus the cumulative composite cost.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfitSpread {
    pub leader_cumulative: Vec<f64>,
    pub values: Vec<f64>,
}

impl ProfitSpread {
    pub fn latest(&self) -> Option<f64> {
        self.values.last().copied()
    }

    pub fn slope(&self, window: usize) -> SpreadSlope {
        spread_slope(&self.values, window)
    }
}

/// Fixed-window first difference of the spread.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadSlope {
    pub window: usize,
    pub values: Vec<Option<f64>>,
}

impl SpreadSlope {
    /// Slope at the last row; `None` when history is shorter than window + 1.
    pub fn latest(&self) -> Option<f64> {
        self.values.last().copied().flatten()
    }
}

pub fn profit_spread(
    table: &AlignedTable,
    leader: &InstrumentId,
    cost: &CompositeCostIndex,
    mode: Cumulation,
) -> ProfitSpread {
    let leader_cumulative = cumulate(&column_returns(table, leader), mode);
    let values = leader_cumulative
        .iter()
        .zip(&cost.cumulative)
        .map(|(l, c)| l - c)
        .collect();

    ProfitSpread {
        leader_cumulative,
        values,
    }
}

pub fn spread_slope(spread: &[f64], window: usize) -> SpreadSlope {
    let values = (0..spread.len())
        .map(|t| (t >= window).then(|| spread[t] - spread[t - window]))
        .collect();
    SpreadSlope { window, values }
}

//! Spread signal classifier.
//!
//! Decision table, first match wins:
//!
//! | condition                           | signal  |
//! |-------------------------------------|---------|
//! | slope absent                        | Neutral (insufficient history) |
//! | S > 0 and K > 0 and leader rising   | Buy     |
//! | S > 0 and K < 0                     | Hold    |
//! | S < 0                               | Sell    |
//! | otherwise                           | Neutral |

use serde::Serialize;

use super::{Signal, SignalAssessment};
use crate::data::AlignedTable;
use crate::domain::InstrumentId;
use crate::metrics::{ProfitSpread, SpreadSlope};

pub const REASON_BUY: &str = "margin expanding and leader trending up";
pub const REASON_HOLD: &str = "margin positive but contracting";
pub const REASON_SELL: &str = "cost growth exceeds leader return";
pub const REASON_NEUTRAL: &str = "no clear directional edge";
pub const REASON_INSUFFICIENT: &str = "insufficient history";

/// Latest-row inputs to the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassifierInput {
    pub spread: f64,
    pub slope: Option<f64>,
    pub leader_rising: bool,
}

impl ClassifierInput {
    /// Gather the classifier inputs at the last row of the table.
    pub fn at_latest(
        table: &AlignedTable,
        leader: &InstrumentId,
        spread: &ProfitSpread,
        slope: &SpreadSlope,
    ) -> Self {
        Self {
            spread: spread.latest().unwrap_or(0.0),
            slope: slope.latest(),
            leader_rising: leader_rising(table, leader, slope.window),
        }
    }

    pub fn classify(&self) -> SignalAssessment {
        classify(self.spread, self.slope, self.leader_rising)
    }
}

/// Map (spread, slope, leader trend) to a signal. Total and deterministic.
pub fn classify(spread: f64, slope: Option<f64>, leader_rising: bool) -> SignalAssessment {
    let Some(slope) = slope else {
        return SignalAssessment::new(Signal::Neutral, REASON_INSUFFICIENT);
    };

    if spread > 0.0 && slope > 0.0 && leader_rising {
        SignalAssessment::new(Signal::Buy, REASON_BUY)
    } else if spread > 0.0 && slope < 0.0 {
        SignalAssessment::new(Signal::Hold, REASON_HOLD)
    } else if spread < 0.0 {
        SignalAssessment::new(Signal::Sell, REASON_SELL)
    } else {
        SignalAssessment::new(Signal::Neutral, REASON_NEUTRAL)
    }
}

/// True when the leader's latest close is above its close `window` rows
/// earlier. Both ends read the filled view, so a leader holiday on the last
/// row compares the most recent genuine close. Too few rows, or a leader
/// with no observations at all, counts as not rising.
pub fn leader_rising(table: &AlignedTable, leader: &InstrumentId, window: usize) -> bool {
    let Some(column) = table.filled(leader) else {
        return false;
    };
    let n = column.len();
    if n <= window {
        return false;
    }
    column[n - 1] > column[n - 1 - window]
}

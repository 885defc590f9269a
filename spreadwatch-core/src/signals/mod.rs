//! Signal classification.
//!
//! Signals are a pure function of the latest spread, slope and leader trend;
//! no clock, no randomness, no state carried between runs.

pub mod classifier;

pub use classifier::{classify, leader_rising, ClassifierInput};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete trading signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Buy,
    Hold,
    Sell,
    Neutral,
}

impl Signal {
    /// Embed colour code (24-bit RGB as an integer).
    pub fn color(self) -> u32 {
        match self {
            Self::Buy => 0x00FF00,
            Self::Hold => 0xFFFF00,
            Self::Sell => 0xFF0000,
            Self::Neutral => 0xBCC0C0,
        }
    }

    /// Headline shown in the report title.
    pub fn headline(self) -> &'static str {
        match self {
            Self::Buy => "Buy",
            Self::Hold => "Hold / Watch",
            Self::Sell => "Avoid / Sell",
            Self::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.headline())
    }
}

/// A signal with its explanation and severity colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignalAssessment {
    pub signal: Signal,
    pub reason: &'static str,
    pub color: u32,
}

impl SignalAssessment {
    pub fn new(signal: Signal, reason: &'static str) -> Self {
        Self {
            signal,
            reason,
            color: signal.color(),
        }
    }
}

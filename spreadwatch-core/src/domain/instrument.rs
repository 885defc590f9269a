use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ids::InstrumentId;

/// What an instrument contributes to the monitor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentRole {
    /// Benchmark equity whose return is compared against the cost index.
    Leader,
    /// Other sector heavyweights, shown in the report and chart only.
    Peer,
    /// Equities expected to lag the leader, shown in the report and chart only.
    Follower,
    /// Primary commodity cost proxy.
    CostPrimary,
    /// Secondary commodity (oil) cost proxy.
    CostSecondary,
    /// FX rate cost factor.
    Fx,
}

impl InstrumentRole {
    pub fn is_cost_factor(self) -> bool {
        matches!(self, Self::CostPrimary | Self::CostSecondary | Self::Fx)
    }
}

/// Where an instrument's prices come from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentSource {
    /// Daily closes from the market-data provider.
    #[default]
    Market,
    /// Current quote from the commodity scraper; history is synthesised.
    Scraped,
}

/// An instrument in the monitored basket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Instrument {
    pub id: InstrumentId,
    /// Presentation label (report and chart legend).
    pub label: String,
    pub role: InstrumentRole,
    #[serde(default)]
    pub source: InstrumentSource,
}

impl Instrument {
    pub fn new(id: &str, label: &str, role: InstrumentRole) -> Self {
        Self {
            id: InstrumentId::from(id),
            label: label.to_string(),
            role,
            source: InstrumentSource::Market,
        }
    }

    pub fn scraped(mut self) -> Self {
        self.source = InstrumentSource::Scraped;
        self
    }
}

/// The three cost-factor columns feeding the composite index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostFactors {
    pub primary: InstrumentId,
    pub secondary: InstrumentId,
    pub fx: InstrumentId,
}

/// Weights of the three cost factors. Each in [0, 1], summing to 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CostWeights {
    pub primary: f64,
    pub secondary: f64,
    pub fx: f64,
}

/// Tolerance used when checking that weights sum to one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

impl CostWeights {
    /// Build validated weights.
    pub fn new(primary: f64, secondary: f64, fx: f64) -> Result<Self, WeightsError> {
        let weights = Self {
            primary,
            secondary,
            fx,
        };
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> Result<(), WeightsError> {
        for (name, w) in [
            ("primary", self.primary),
            ("secondary", self.secondary),
            ("fx", self.fx),
        ] {
            if !(0.0..=1.0).contains(&w) {
                return Err(WeightsError::OutOfRange {
                    factor: name,
                    weight: w,
                });
            }
        }
        let sum = self.primary + self.secondary + self.fx;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WeightsError::BadSum { sum });
        }
        Ok(())
    }
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            primary: 0.4,
            secondary: 0.3,
            fx: 0.3,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum WeightsError {
    #[error("weight for {factor} must be in [0, 1], got {weight}")]
    OutOfRange { factor: &'static str, weight: f64 },

    #[error("cost weights must sum to 1.0, got {sum}")]
    BadSum { sum: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_are_valid() {
        assert!(CostWeights::default().validate().is_ok());
    }

    #[test]
    fn weights_must_sum_to_one() {
        let err = CostWeights::new(0.5, 0.3, 0.3).unwrap_err();
        assert!(matches!(err, WeightsError::BadSum { .. }));
    }

    #[test]
    fn weights_reject_negative() {
        let err = CostWeights::new(-0.1, 0.6, 0.5).unwrap_err();
        assert_eq!(
            err,
            WeightsError::OutOfRange {
                factor: "primary",
                weight: -0.1
            }
        );
    }

    #[test]
    fn floating_noise_is_tolerated() {
        assert!(CostWeights::new(0.1 + 0.2, 0.3, 0.4).is_ok());
    }

    #[test]
    fn only_cost_roles_are_cost_factors() {
        assert!(InstrumentRole::Fx.is_cost_factor());
        assert!(InstrumentRole::CostPrimary.is_cost_factor());
        assert!(!InstrumentRole::Leader.is_cost_factor());
        assert!(!InstrumentRole::Follower.is_cost_factor());
    }

    #[test]
    fn scraped_builder_sets_source() {
        let inst = Instrument::new("RUBBER", "Rubber", InstrumentRole::CostPrimary).scraped();
        assert_eq!(inst.source, InstrumentSource::Scraped);
    }
}

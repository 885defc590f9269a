//! Domain types for SpreadWatch

pub mod ids;
pub mod instrument;

pub use ids::{DatasetHash, InstrumentId};
pub use instrument::{
    CostFactors, CostWeights, Instrument, InstrumentRole, InstrumentSource, WeightsError,
};

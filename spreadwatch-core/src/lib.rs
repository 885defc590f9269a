//! SpreadWatch Core: the analytic engine behind the sector spread monitor.
//!
//! This crate contains:
//! - Domain types (instrument ids, roles, cost weights)
//! - Data collaborators (Yahoo Finance closes, CSV import, commodity quote
//!   scraping, synthesised history for quote-only instruments)
//! - Series alignment into raw and forward-filled views
//! - Composite cost index, profit spread and spread slope
//! - Signal classification and latest-observation resolution
//! - Dataset fingerprinting

pub mod data;
pub mod domain;
pub mod fingerprint;
pub mod metrics;
pub mod signals;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: values threaded through the pipeline are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<data::AlignedTable>();
        require_sync::<data::AlignedTable>();
        require_send::<data::CommodityQuote>();
        require_sync::<data::CommodityQuote>();
        require_send::<metrics::CompositeCostIndex>();
        require_sync::<metrics::CompositeCostIndex>();
        require_send::<metrics::ProfitSpread>();
        require_sync::<metrics::ProfitSpread>();
        require_send::<metrics::LatestObservation>();
        require_sync::<metrics::LatestObservation>();
        require_send::<signals::SignalAssessment>();
        require_sync::<signals::SignalAssessment>();
        require_send::<domain::CostWeights>();
        require_sync::<domain::CostWeights>();
    }

    /// Architecture contract: the classifier takes no clock and no table.
    #[test]
    fn classifier_is_a_pure_function_of_its_inputs() {
        let a = signals::classify(0.01, Some(0.002), true);
        let b = signals::classify(0.01, Some(0.002), true);
        assert_eq!(a, b);
    }
}

//! Composite cost index, profit spread and latest-value resolution.
//!
//! Every function here is pure: it reads the aligned table and explicit
//! parameters and returns a new value.

pub mod composite;
pub mod latest;
pub mod returns;
pub mod spread;

pub use composite::{composite_cost_index, CompositeCostIndex};
pub use latest::{resolve_latest, LatestObservation};
pub use returns::{cumulate, pct_changes, Cumulation};
pub use spread::{profit_spread, spread_slope, ProfitSpread, SpreadSlope, DEFAULT_SLOPE_WINDOW};

/// Build a price table from gap-free columns on consecutive days from 2024-01-02.
#[cfg(test)]
pub fn make_price_table(columns: &[(&str, &[f64])]) -> crate::data::PriceTable {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    columns
        .iter()
        .map(|(id, closes)| {
            let series = closes
                .iter()
                .enumerate()
                .map(|(i, &c)| (base_date + chrono::Duration::days(i as i64), c))
                .collect();
            (crate::domain::InstrumentId::from(*id), series)
        })
        .collect()
}

/// Aligned table from gap-free columns, for tests.
#[cfg(test)]
pub fn make_table(columns: &[(&str, &[f64])]) -> crate::data::AlignedTable {
    crate::data::align_series(&make_price_table(columns)).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for metric tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

//! Synthesised history for quote-only instruments.
//!
//! A scraped commodity has a current price but no daily history. To give the
//! composite index something to difference, a seeded Gaussian random walk is
//! walked backward from the current price across the market date index. The
//! last row always equals the quote, and the same seed gives the same path.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::PriceSeries;

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_SIGMA: f64 = 1.5;

/// Build a series over `dates` that ends at `current_price`.
///
/// Each step back subtracts a N(0, sigma) draw. Prices are floored at 1% of
/// the current price so the walk never reaches zero.
pub fn synthesize_history(
    dates: &[NaiveDate],
    current_price: f64,
    seed: u64,
    sigma: f64,
) -> PriceSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let floor = current_price.abs() * 0.01;

    let mut prices = Vec::with_capacity(dates.len());
    let mut price = current_price;
    for i in 0..dates.len() {
        if i > 0 {
            price = (price - sigma * standard_normal(&mut rng)).max(floor);
        }
        prices.push(price);
    }
    prices.reverse();

    dates.iter().copied().zip(prices).collect()
}

/// Box-Muller draw from N(0, 1).
fn standard_normal(rng: &mut impl Rng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        (0..n).map(|i| base + chrono::Duration::days(i as i64)).collect()
    }

    #[test]
    fn last_row_is_current_price() {
        let ds = dates(30);
        let series = synthesize_history(&ds, 185.0, DEFAULT_SEED, DEFAULT_SIGMA);
        assert_eq!(series.len(), 30);
        assert_eq!(series[ds.last().unwrap()], 185.0);
    }

    #[test]
    fn same_seed_same_path() {
        let ds = dates(20);
        let a = synthesize_history(&ds, 185.0, 7, DEFAULT_SIGMA);
        let b = synthesize_history(&ds, 185.0, 7, DEFAULT_SIGMA);
        let c = synthesize_history(&ds, 185.0, 8, DEFAULT_SIGMA);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn zero_sigma_is_flat() {
        let ds = dates(5);
        let series = synthesize_history(&ds, 100.0, DEFAULT_SEED, 0.0);
        assert!(series.values().all(|v| *v == 100.0));
    }

    #[test]
    fn stays_positive_under_large_sigma() {
        let ds = dates(200);
        let series = synthesize_history(&ds, 2.0, DEFAULT_SEED, 50.0);
        assert!(series.values().all(|v| *v > 0.0));
    }

    #[test]
    fn empty_dates_empty_series() {
        assert!(synthesize_history(&[], 185.0, DEFAULT_SEED, DEFAULT_SIGMA).is_empty());
    }
}

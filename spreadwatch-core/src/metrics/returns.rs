//! Day-over-day returns and their cumulation.
//!
//! r[t] = (p[t] - p[t-1]) / p[t-1], with r[0] = 0 so cumulative series start
//! at exactly zero. A zero previous price gives a zero return.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How daily returns are accumulated into a drift since the window start.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Cumulation {
    /// Running sum. Additive approximation, fine for week-scale windows.
    #[default]
    Additive,
    /// Running product of (1 + r), minus one.
    Compounding,
}

impl FromStr for Cumulation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "additive" | "sum" => Ok(Self::Additive),
            "compounding" | "product" => Ok(Self::Compounding),
            other => Err(format!("unknown cumulation '{other}' (expected additive|compounding)")),
        }
    }
}

/// Fractional day-over-day change of a gap-free price column.
pub fn pct_changes(prices: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(prices.len());
    for (i, &p) in prices.iter().enumerate() {
        if i == 0 {
            out.push(0.0);
            continue;
        }
        let prev = prices[i - 1];
        if prev == 0.0 {
            out.push(0.0);
        } else {
            out.push((p - prev) / prev);
        }
    }
    out
}

/// Accumulate per-row returns.
pub fn cumulate(returns: &[f64], mode: Cumulation) -> Vec<f64> {
    match mode {
        Cumulation::Additive => returns
            .iter()
            .scan(0.0, |acc, r| {
                *acc += r;
                Some(*acc)
            })
            .collect(),
        Cumulation::Compounding => returns
            .iter()
            .scan(1.0, |growth, r| {
                *growth *= 1.0 + r;
                Some(*growth - 1.0)
            })
            .collect(),
    }
}

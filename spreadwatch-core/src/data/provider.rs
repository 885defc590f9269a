//! Market-data provider trait and structured error types.
//!
//! The MarketDataProvider trait abstracts over data sources (Yahoo Finance, CSV
//! import) so we can swap implementations and stub them in tests.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::InstrumentId;

/// Closing prices for one instrument, ordered by date. Dates the instrument
/// did not trade are simply absent.
pub type PriceSeries = BTreeMap<NaiveDate, f64>;

/// Closing prices for a set of instruments as returned by a provider.
/// Instruments the provider could not find have no entry.
pub type PriceTable = BTreeMap<InstrumentId, PriceSeries>;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// No instrument returned any price; the run cannot continue.
    #[error("no price data available for any requested instrument")]
    DataUnavailable,

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("csv import error: {0}")]
    Csv(String),

    #[error("data error: {0}")]
    Other(String),
}

impl From<csv::Error> for DataError {
    fn from(e: csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}

/// Trait for market-data providers.
///
/// `fetch_closes` covers the half-open window `[start, end)`. A ticker the
/// provider does not know is left out of the table rather than failing the
/// call; transport and format failures are errors.
pub trait MarketDataProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    fn fetch_closes(
        &self,
        ids: &[InstrumentId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable, DataError>;
}

/// Provider backed by an in-memory table. Used for tests and replays.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    table: PriceTable,
}

impl StaticProvider {
    pub fn new(table: PriceTable) -> Self {
        Self { table }
    }
}

impl MarketDataProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch_closes(
        &self,
        ids: &[InstrumentId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable, DataError> {
        Ok(ids
            .iter()
            .filter_map(|id| {
                self.table.get(id).map(|series| {
                    let windowed: PriceSeries = series
                        .range(start..end)
                        .map(|(d, v)| (*d, *v))
                        .collect();
                    (id.clone(), windowed)
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn static_provider_respects_half_open_window() {
        let mut table = PriceTable::new();
        table.insert(
            InstrumentId::from("GT"),
            [(d("2024-01-02"), 10.0), (d("2024-01-03"), 11.0), (d("2024-01-04"), 12.0)]
                .into_iter()
                .collect(),
        );
        let provider = StaticProvider::new(table);
        let out = provider
            .fetch_closes(&["GT".into()], d("2024-01-02"), d("2024-01-04"))
            .unwrap();
        let gt = &out[&InstrumentId::from("GT")];
        assert_eq!(gt.len(), 2);
        assert!(!gt.contains_key(&d("2024-01-04")));
    }

    #[test]
    fn static_provider_omits_unknown_tickers() {
        let provider = StaticProvider::default();
        let out = provider
            .fetch_closes(&["NOPE".into()], d("2024-01-01"), d("2024-02-01"))
            .unwrap();
        assert!(out.is_empty());
    }
}

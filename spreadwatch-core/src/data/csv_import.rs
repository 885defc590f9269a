//! CSV import provider.
//!
//! Offline replacement for the network provider. Reads long-format closes:
//!
//! ```text
//! date,symbol,close
//! 2024-01-02,5108.T,6120.0
//! 2024-01-02,GT,8.41
//! ```
//!
//! Empty `close` cells are treated as non-trading days.

use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::provider::{DataError, MarketDataProvider, PriceTable};
use crate::domain::InstrumentId;

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    symbol: String,
    close: Option<f64>,
}

/// Parse long-format CSV into a price table.
pub fn read_price_csv<R: Read>(reader: R) -> Result<PriceTable, DataError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut table = PriceTable::new();
    for row in rdr.deserialize::<CsvRow>() {
        let row = row?;
        let Some(close) = row.close else {
            continue;
        };
        table
            .entry(InstrumentId::new(row.symbol))
            .or_default()
            .insert(row.date, close);
    }
    Ok(table)
}

/// Market-data provider reading a CSV file on every fetch.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    path: PathBuf,
}

impl CsvProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl MarketDataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch_closes(
        &self,
        ids: &[InstrumentId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceTable, DataError> {
        let file = std::fs::File::open(&self.path)
            .map_err(|e| DataError::Csv(format!("{}: {e}", self.path.display())))?;
        let mut all = read_price_csv(file)?;

        Ok(ids
            .iter()
            .filter_map(|id| {
                all.remove(id).map(|series| {
                    let windowed = series.range(start..end).map(|(d, v)| (*d, *v)).collect();
                    (id.clone(), windowed)
                })
            })
            .collect())
    }
}

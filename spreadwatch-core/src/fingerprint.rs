//! Dataset fingerprinting.
//!
//! A BLAKE3 hash over the raw aligned table identifies exactly which prices a
//! report was computed from. Two runs on the same data produce the same hash.

use crate::data::AlignedTable;
use crate::domain::DatasetHash;

/// Hash dates and raw values in instrument-id order.
///
/// Gaps hash differently from any price so a filled table and its raw
/// counterpart never collide.
pub fn dataset_hash(table: &AlignedTable) -> DatasetHash {
    let mut hasher = blake3::Hasher::new();

    for date in table.dates() {
        hasher.update(date.to_string().as_bytes());
    }

    for id in table.instruments() {
        hasher.update(id.as_str().as_bytes());
        if let Some(column) = table.raw(id) {
            for value in column {
                match value {
                    Some(v) => {
                        hasher.update(&[1]);
                        hasher.update(&v.to_le_bytes());
                    }
                    None => {
                        hasher.update(&[0]);
                    }
                }
            }
        }
    }

    DatasetHash::from_hash(hasher.finalize().to_hex().as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{align_series, PriceTable};
    use chrono::NaiveDate;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn table(second_close: f64) -> AlignedTable {
        let mut input = PriceTable::new();
        input.insert(
            "GT".into(),
            [(d("2024-01-02"), 10.0), (d("2024-01-03"), second_close)]
                .into_iter()
                .collect(),
        );
        input.insert("BZ=F".into(), [(d("2024-01-02"), 80.0)].into_iter().collect());
        align_series(&input).unwrap()
    }

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(dataset_hash(&table(11.0)), dataset_hash(&table(11.0)));
        assert_eq!(dataset_hash(&table(11.0)).0.len(), 64);
    }

    #[test]
    fn hash_changes_with_prices() {
        assert_ne!(dataset_hash(&table(11.0)), dataset_hash(&table(11.5)));
    }
}

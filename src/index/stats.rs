//! Corpus statistics for full-text fields.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::IndexStore;

/// Running value count and average value length of one `(table, field)`.
///
/// Absent statistics read as `(0, 0.0)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    /// Number of values indexed so far.
    pub count: u64,
    /// Average value length in characters.
    pub avg_length: f64,
}

impl FieldStats {
    /// Statistics after indexing `values` more values of combined length `total_length`.
    ///
    /// The count never decreases and the average is never NaN.
    pub fn record(&self, values: usize, total_length: usize) -> FieldStats {
        let count = self.count + values as u64;
        let avg_length = if count == 0 {
            0.0
        } else {
            (self.avg_length * self.count as f64 + total_length as f64) / count as f64
        };
        FieldStats {
            count,
            avg_length: if avg_length.is_finite() { avg_length } else { 0.0 },
        }
    }

    /// Metadata key the statistics are stored under.
    pub fn metadata_key(table: &str, field: &str) -> String {
        format!("full-text:field-stats:{table}:{field}")
    }

    /// Read the statistics of a field. Undecodable values read as empty.
    pub fn load(store: &dyn IndexStore, table: &str, field: &str) -> Result<FieldStats> {
        let key = Self::metadata_key(table, field);
        let Some(bytes) = store.get_metadata(&key)? else {
            return Ok(FieldStats::default());
        };
        match bincode::deserialize(&bytes) {
            Ok(stats) => Ok(stats),
            Err(e) => {
                warn!("ignoring corrupt field statistics {key}: {e}");
                Ok(FieldStats::default())
            }
        }
    }

    /// Write the statistics of a field.
    pub fn save(&self, store: &dyn IndexStore, table: &str, field: &str) -> Result<()> {
        store.put_metadata(&Self::metadata_key(table, field), bincode::serialize(self)?)
    }
}

//! Position metadata carried by full-text postings.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TesseraError};
use crate::query::matching::TextRange;

/// Occurrences of one term within one value of a multi-valued field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionEntry {
    /// Index of the value inside the field's value list.
    pub value_index: usize,
    /// Length of that value in characters.
    pub value_length: usize,
    /// Source spans of every occurrence of the term in the value.
    pub ranges: Vec<TextRange>,
}

impl PositionEntry {
    /// The placeholder used for postings that carry no positions.
    pub fn empty() -> Self {
        PositionEntry {
            value_index: 0,
            value_length: 0,
            ranges: Vec::new(),
        }
    }

    /// Number of occurrences.
    pub fn term_freq(&self) -> usize {
        self.ranges.len()
    }
}

/// Encode the position entries of one posting row.
pub fn encode_positions(entries: &[PositionEntry]) -> Result<Vec<u8>> {
    Ok(bincode::serialize(entries)?)
}

/// Decode the position entries of one posting row.
pub fn decode_positions(bytes: &[u8]) -> Result<Vec<PositionEntry>> {
    bincode::deserialize(bytes)
        .map_err(|e| TesseraError::encoding(format!("invalid position entries: {e}")))
}

//! Field definitions for table schemas.

use serde::{Deserialize, Serialize};

/// How a field's values are indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Exact-match string values
    String,
    /// Exact-match 64-bit integers
    Integer,
    /// Exact-match booleans
    Boolean,
    /// Tokenized, BM25-scored text
    FullText,
}

/// Definition of one field in a table schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Index type of the field.
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Whether the field is returned with search results.
    #[serde(default = "default_true")]
    pub store: bool,

    /// Whether postings are written for the field.
    #[serde(default = "default_true")]
    pub index: bool,
}

fn default_true() -> bool {
    true
}

impl FieldSchema {
    /// A stored and indexed field of the given type.
    pub fn new(field_type: FieldType) -> Self {
        FieldSchema {
            field_type,
            store: true,
            index: true,
        }
    }

    /// Stored and indexed exact-match string field.
    pub fn string() -> Self {
        Self::new(FieldType::String)
    }

    /// Stored and indexed integer field.
    pub fn integer() -> Self {
        Self::new(FieldType::Integer)
    }

    /// Stored and indexed boolean field.
    pub fn boolean() -> Self {
        Self::new(FieldType::Boolean)
    }

    /// Stored and indexed full-text field.
    pub fn full_text() -> Self {
        Self::new(FieldType::FullText)
    }

    /// Set whether this field is stored.
    pub fn stored(mut self, store: bool) -> Self {
        self.store = store;
        self
    }

    /// Set whether this field is indexed.
    pub fn indexed(mut self, index: bool) -> Self {
        self.index = index;
        self
    }
}

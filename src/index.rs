//! Inverted indexes over encoded posting keys.
//!
//! Every indexed field of a table owns one [`InvertedIndex`]. Exact-match
//! types (string, integer, boolean) write one posting per distinct value;
//! full-text fields write one posting per distinct term together with the
//! positions it occurs at.

pub mod exact;
pub mod full_text;
pub mod key;
pub mod posting;
pub mod stats;

use std::fmt::Debug;
use std::sync::Arc;

use crate::analysis::Tokenizer;
use crate::document::FieldValue;
use crate::error::Result;
use crate::query::matching::Match;
use crate::schema::{FieldSchema, FieldType};
use crate::scoring::{Bm25, TermWeighting};
use crate::storage::{DocNum, IndexStore, KeyRange};

pub use exact::{
    BooleanInvertedIndex, ExactInvertedIndex, IntegerInvertedIndex, StringInvertedIndex,
};
pub use full_text::FullTextInvertedIndex;
pub use key::IndexKey;
pub use posting::PositionEntry;
pub use stats::FieldStats;

/// A per-field inverted index bound to one table.
pub trait InvertedIndex: Send + Sync + Debug {
    /// Table the postings belong to.
    fn table(&self) -> &str;

    /// Field the index covers.
    fn field(&self) -> &str;

    /// Documents matching `term`, scored.
    fn match_term(&self, store: &dyn IndexStore, term: &str) -> Result<Match>;

    /// Every document with at least one posting in the field, scored 1.
    fn all(&self, store: &dyn IndexStore) -> Result<Match> {
        scan_field(store, self.table(), self.field())
    }

    /// Reject values the field cannot index, before anything is written.
    fn check(&self, _values: &[FieldValue]) -> Result<()> {
        Ok(())
    }

    /// Write postings for the values of one document.
    fn insert(&self, store: &dyn IndexStore, nid: DocNum, values: &[FieldValue]) -> Result<()>;

    /// Remove every posting of `nid` in the field. Returns the number removed.
    fn delete(&self, store: &dyn IndexStore, nid: DocNum) -> Result<usize> {
        store.delete_postings(self.table(), &field_range(self.field()), nid)
    }
}

/// Key range covering every posting of `field`.
pub fn field_range(field: &str) -> KeyRange {
    let prefix = IndexKey::for_prefix(field);
    KeyRange::half_open(prefix.to_bytes(), prefix.succ().to_bytes())
}

/// Distinct documents with a posting in `field`, each scored 1.
pub fn scan_field(store: &dyn IndexStore, table: &str, field: &str) -> Result<Match> {
    let mut result = Match::new();
    for row in store.scan_postings(table, &field_range(field), None)? {
        if !result.contains(row.nid) {
            result.add_score(row.nid, 1.0);
        }
    }
    Ok(result)
}

/// Analysis and scoring components shared by full-text indexes.
#[derive(Debug, Clone)]
pub struct FullTextSettings {
    /// Splits values and query terms into tokens.
    pub tokenizer: Arc<dyn Tokenizer>,
    /// Per-occurrence relevance function.
    pub scorer: Bm25,
    /// Weight of a prefix-expanded match relative to the query token.
    pub weighting: Arc<dyn TermWeighting>,
    /// Maximum number of prefix-expanded rows fetched per query token.
    pub prefix_scan_limit: usize,
}

impl Default for FullTextSettings {
    fn default() -> Self {
        FullTextSettings {
            tokenizer: Arc::new(crate::analysis::GeneralTokenizer::new()),
            scorer: Bm25::default(),
            weighting: Arc::new(crate::scoring::LengthRatio),
            prefix_scan_limit: 5000,
        }
    }
}

/// Build the index for one schema field.
pub fn open_index(
    table: &str,
    field: &str,
    schema: &FieldSchema,
    settings: &FullTextSettings,
) -> Box<dyn InvertedIndex> {
    match schema.field_type {
        FieldType::String => Box::new(StringInvertedIndex::new(table, field)),
        FieldType::Integer => Box::new(IntegerInvertedIndex::new(table, field)),
        FieldType::Boolean => Box::new(BooleanInvertedIndex::new(table, field)),
        FieldType::FullText => Box::new(FullTextInvertedIndex::new(table, field, settings.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryIndexStore, PostingRow};

    #[test]
    fn test_field_range_is_isolated() {
        let range = field_range("tag");
        assert!(range.contains(&IndexKey::for_string("tag", "").to_bytes()));
        assert!(range.contains(&IndexKey::for_string("tag", "\u{10FFFF}").to_bytes()));
        assert!(!range.contains(&IndexKey::for_string("tags", "a").to_bytes()));
        assert!(!range.contains(&IndexKey::for_string("ta", "g").to_bytes()));
    }

    #[test]
    fn test_scan_field_dedupes() {
        let store = MemoryIndexStore::new();
        for value in ["a", "b"] {
            let row = PostingRow {
                key: IndexKey::for_string("tag", value).to_bytes(),
                nid: 7,
                positions: None,
            };
            store.put_posting("doc", row).unwrap();
        }
        let all = scan_field(&store, "doc", "tag").unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all.score(7), Some(1.0));
    }

    #[test]
    fn test_open_index_dispatch() {
        let settings = FullTextSettings::default();
        let index = open_index("doc", "body", &FieldSchema::full_text(), &settings);
        assert_eq!(index.table(), "doc");
        assert_eq!(index.field(), "body");
    }
}

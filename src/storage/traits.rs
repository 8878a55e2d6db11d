//! Storage abstraction trait and common types.

use std::ops::Bound;

use crate::error::Result;

/// Dense internal document number assigned by the store.
pub type DocNum = u64;

/// A range over encoded posting keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    /// Lower bound.
    pub lower: Bound<Vec<u8>>,
    /// Upper bound.
    pub upper: Bound<Vec<u8>>,
}

impl KeyRange {
    /// A range matching exactly one key.
    pub fn exact(key: Vec<u8>) -> Self {
        KeyRange {
            lower: Bound::Included(key.clone()),
            upper: Bound::Included(key),
        }
    }

    /// The half-open range `[lower, upper)`.
    pub fn half_open(lower: Vec<u8>, upper: Vec<u8>) -> Self {
        KeyRange {
            lower: Bound::Included(lower),
            upper: Bound::Excluded(upper),
        }
    }

    /// The open range `(lower, upper)`.
    pub fn open(lower: Vec<u8>, upper: Vec<u8>) -> Self {
        KeyRange {
            lower: Bound::Excluded(lower),
            upper: Bound::Excluded(upper),
        }
    }

    /// Whether `key` is above the lower bound.
    pub fn above_lower(&self, key: &[u8]) -> bool {
        match &self.lower {
            Bound::Included(lower) => key >= lower.as_slice(),
            Bound::Excluded(lower) => key > lower.as_slice(),
            Bound::Unbounded => true,
        }
    }

    /// Whether `key` is below the upper bound.
    pub fn below_upper(&self, key: &[u8]) -> bool {
        match &self.upper {
            Bound::Included(upper) => key <= upper.as_slice(),
            Bound::Excluded(upper) => key < upper.as_slice(),
            Bound::Unbounded => true,
        }
    }

    /// Whether `key` falls inside the range.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.above_lower(key) && self.below_upper(key)
    }
}

/// One row of the inverted index: an encoded key pointing at a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingRow {
    /// Encoded `(field, value)` key.
    pub key: Vec<u8>,
    /// Internal document number.
    pub nid: DocNum,
    /// Encoded position entries, present for full-text postings.
    pub positions: Option<Vec<u8>>,
}

/// A stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRow {
    /// Internal document number.
    pub nid: DocNum,
    /// External document id.
    pub id: String,
    /// Encoded document fields.
    pub data: Vec<u8>,
}

/// The backing store an indexer runs against.
///
/// It holds three logical areas: posting rows ordered by `(table, key, nid)`,
/// metadata values addressed by string key, and stored documents per table.
/// Atomicity and isolation across calls are the implementation's concern;
/// the indexer only requires that a scan observes a consistent view.
pub trait IndexStore: Send + Sync + std::fmt::Debug {
    /// Posting rows of `table` whose key falls in `range`, in ascending
    /// `(key, nid)` order, at most `limit` of them.
    fn scan_postings(&self, table: &str, range: &KeyRange, limit: Option<usize>)
    -> Result<Vec<PostingRow>>;

    /// Insert or overwrite the posting row `(table, row.key, row.nid)`.
    fn put_posting(&self, table: &str, row: PostingRow) -> Result<()>;

    /// Remove the rows of `nid` whose key falls in `range`. Returns how many were removed.
    fn delete_postings(&self, table: &str, range: &KeyRange, nid: DocNum) -> Result<usize>;

    /// Read a metadata value.
    fn get_metadata(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write a metadata value.
    fn put_metadata(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Read a stored document by internal number.
    fn get_record(&self, table: &str, nid: DocNum) -> Result<Option<RecordRow>>;

    /// Read a stored document by external id.
    fn find_record(&self, table: &str, id: &str) -> Result<Option<RecordRow>>;

    /// Store a document, reusing the internal number if `id` already exists.
    fn put_record(&self, table: &str, id: &str, data: Vec<u8>) -> Result<DocNum>;

    /// Remove a stored document, returning its internal number if it existed.
    fn delete_record(&self, table: &str, id: &str) -> Result<Option<DocNum>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_range_bounds() {
        let exact = KeyRange::exact(b"b".to_vec());
        assert!(exact.contains(b"b"));
        assert!(!exact.contains(b"ba"));

        let half_open = KeyRange::half_open(b"b".to_vec(), b"c".to_vec());
        assert!(half_open.contains(b"b"));
        assert!(half_open.contains(b"bzz"));
        assert!(!half_open.contains(b"c"));

        let open = KeyRange::open(b"b".to_vec(), b"c".to_vec());
        assert!(!open.contains(b"b"));
        assert!(open.contains(b"ba"));
    }
}

//! Exact-match inverted indexes for string, integer and boolean fields.

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::marker::PhantomData;

use log::debug;

use crate::document::FieldValue;
use crate::error::{Result, TesseraError};
use crate::index::InvertedIndex;
use crate::index::key::IndexKey;
use crate::query::matching::Match;
use crate::storage::{DocNum, IndexStore, KeyRange, PostingRow};

/// How an exact-match field encodes stored values and query terms.
pub trait ExactEncoding: Send + Sync + Debug + 'static {
    /// Key for a stored value.
    fn value_key(field: &str, value: &FieldValue) -> Result<IndexKey>;

    /// Key for a query term.
    fn term_key(field: &str, term: &str) -> Result<IndexKey>;
}

/// Values keyed by their text form.
#[derive(Debug)]
pub struct StringEncoding;

impl ExactEncoding for StringEncoding {
    fn value_key(field: &str, value: &FieldValue) -> Result<IndexKey> {
        Ok(match value {
            FieldValue::Text(text) => IndexKey::for_string(field, text),
            other => IndexKey::for_string(field, &other.to_string()),
        })
    }

    fn term_key(field: &str, term: &str) -> Result<IndexKey> {
        Ok(IndexKey::for_string(field, term))
    }
}

/// Values keyed as order-preserving 64-bit integers.
#[derive(Debug)]
pub struct IntegerEncoding;

impl ExactEncoding for IntegerEncoding {
    fn value_key(field: &str, value: &FieldValue) -> Result<IndexKey> {
        value
            .as_integer()
            .map(|v| IndexKey::for_int64(field, v))
            .ok_or_else(|| {
                TesseraError::schema(format!("field {field} expects integers, got {value}"))
            })
    }

    fn term_key(field: &str, term: &str) -> Result<IndexKey> {
        term.trim()
            .parse::<i64>()
            .map(|v| IndexKey::for_int64(field, v))
            .map_err(|_| TesseraError::query(format!("invalid integer term for {field}: {term}")))
    }
}

/// Values keyed as a single boolean byte.
#[derive(Debug)]
pub struct BooleanEncoding;

impl ExactEncoding for BooleanEncoding {
    fn value_key(field: &str, value: &FieldValue) -> Result<IndexKey> {
        value
            .as_boolean()
            .map(|v| IndexKey::for_boolean(field, v))
            .ok_or_else(|| {
                TesseraError::schema(format!("field {field} expects booleans, got {value}"))
            })
    }

    fn term_key(field: &str, term: &str) -> Result<IndexKey> {
        Ok(IndexKey::for_boolean(field, term == "true"))
    }
}

/// An index whose postings are the distinct values of a field.
///
/// A match is a point lookup and scores every hit 1.
#[derive(Debug)]
pub struct ExactInvertedIndex<E: ExactEncoding> {
    table: String,
    field: String,
    _encoding: PhantomData<E>,
}

/// Exact-match index over text values.
pub type StringInvertedIndex = ExactInvertedIndex<StringEncoding>;
/// Exact-match index over integer values.
pub type IntegerInvertedIndex = ExactInvertedIndex<IntegerEncoding>;
/// Exact-match index over boolean values.
pub type BooleanInvertedIndex = ExactInvertedIndex<BooleanEncoding>;

impl<E: ExactEncoding> ExactInvertedIndex<E> {
    /// Create an index for `field` of `table`.
    pub fn new(table: &str, field: &str) -> Self {
        ExactInvertedIndex {
            table: table.to_string(),
            field: field.to_string(),
            _encoding: PhantomData,
        }
    }
}

impl<E: ExactEncoding> InvertedIndex for ExactInvertedIndex<E> {
    fn table(&self) -> &str {
        &self.table
    }

    fn field(&self) -> &str {
        &self.field
    }

    fn match_term(&self, store: &dyn IndexStore, term: &str) -> Result<Match> {
        let key = E::term_key(&self.field, term)?;
        let mut result = Match::new();
        for row in store.scan_postings(&self.table, &KeyRange::exact(key.to_bytes()), None)? {
            if !result.contains(row.nid) {
                result.add_score(row.nid, 1.0);
            }
        }
        Ok(result)
    }

    fn check(&self, values: &[FieldValue]) -> Result<()> {
        for value in values {
            E::value_key(&self.field, value)?;
        }
        Ok(())
    }

    fn insert(&self, store: &dyn IndexStore, nid: DocNum, values: &[FieldValue]) -> Result<()> {
        let keys = values
            .iter()
            .map(|value| E::value_key(&self.field, value).map(|key| key.to_bytes()))
            .collect::<Result<BTreeSet<_>>>()?;

        debug!(
            "indexing {} distinct values of {}.{} for document {nid}",
            keys.len(),
            self.table,
            self.field
        );
        for key in keys {
            store.put_posting(
                &self.table,
                PostingRow {
                    key,
                    nid,
                    positions: None,
                },
            )?;
        }
        Ok(())
    }
}

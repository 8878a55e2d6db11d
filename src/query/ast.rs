//! Query syntax tree.
//!
//! Queries are plain data and deserialize from JSON:
//!
//! ```
//! use tessera::query::{Occur, Query};
//!
//! let query: Query = serde_json::from_str(
//!     r#"{"type":"boolean","occur":"must","queries":[
//!         {"type":"match","field":"content","match":"quick"},
//!         {"type":"exists","field":"title"}
//!     ]}"#,
//! ).unwrap();
//!
//! assert_eq!(
//!     query,
//!     Query::boolean(Occur::Must, vec![
//!         Query::term("content", "quick"),
//!         Query::exists("title"),
//!     ])
//! );
//! ```

use serde::{Deserialize, Serialize};

/// How the children of a boolean query combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occur {
    /// Every child must match; scores are summed.
    Must,
    /// Any child may match; scores are summed.
    Should,
    /// No child may match.
    MustNot,
}

/// A query node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Query {
    /// Documents whose `field` matches `term`.
    Match {
        field: String,
        #[serde(rename = "match")]
        term: String,
    },
    /// Documents with any posting in `field`.
    Exists { field: String },
    /// Every indexed document of the table, scored 1.
    All,
    /// A combination of child queries.
    Boolean { occur: Occur, queries: Vec<Query> },
    /// The inner query with every score multiplied by `factor`.
    Boost {
        query: Box<Query>,
        #[serde(rename = "boost")]
        factor: f32,
    },
    /// Any node kind this crate does not understand.
    #[serde(other)]
    Unsupported,
}

impl Query {
    /// A `match` node.
    pub fn term<F: Into<String>, T: Into<String>>(field: F, term: T) -> Self {
        Query::Match {
            field: field.into(),
            term: term.into(),
        }
    }

    /// An `exists` node.
    pub fn exists<F: Into<String>>(field: F) -> Self {
        Query::Exists {
            field: field.into(),
        }
    }

    /// A `boolean` node.
    pub fn boolean(occur: Occur, queries: Vec<Query>) -> Self {
        Query::Boolean { occur, queries }
    }

    /// Shorthand for a `must` boolean node.
    pub fn must(queries: Vec<Query>) -> Self {
        Self::boolean(Occur::Must, queries)
    }

    /// Shorthand for a `should` boolean node.
    pub fn should(queries: Vec<Query>) -> Self {
        Self::boolean(Occur::Should, queries)
    }

    /// Shorthand for a `must_not` boolean node.
    pub fn must_not(queries: Vec<Query>) -> Self {
        Self::boolean(Occur::MustNot, queries)
    }

    /// Wrap this query in a `boost` node.
    pub fn boosted(self, factor: f32) -> Self {
        Query::Boost {
            query: Box::new(self),
            factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_node_kinds() {
        let query: Query = serde_json::from_str(r#"{"type":"all"}"#).unwrap();
        assert_eq!(query, Query::All);

        let query: Query =
            serde_json::from_str(r#"{"type":"boost","query":{"type":"all"},"boost":2.5}"#).unwrap();
        assert_eq!(query, Query::All.boosted(2.5));

        let query: Query =
            serde_json::from_str(r#"{"type":"boolean","occur":"must_not","queries":[]}"#).unwrap();
        assert_eq!(query, Query::must_not(vec![]));
    }

    #[test]
    fn test_unknown_kind_is_unsupported() {
        let query: Query = serde_json::from_str(r#"{"type":"fuzzy"}"#).unwrap();
        assert_eq!(query, Query::Unsupported);
    }

    #[test]
    fn test_serialize_match() {
        let json = serde_json::to_string(&Query::term("title", "hello")).unwrap();
        assert_eq!(json, r#"{"type":"match","field":"title","match":"hello"}"#);
    }
}

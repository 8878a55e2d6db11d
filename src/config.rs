//! Indexer configuration.
//!
//! ```
//! use tessera::config::IndexerConfig;
//!
//! let config = IndexerConfig::from_json_str(r#"{
//!     "prefix_scan_limit": 100,
//!     "tables": {
//!         "doc": {
//!             "title": {"type": "full_text"},
//!             "tag": {"type": "string", "store": false}
//!         }
//!     }
//! }"#).unwrap();
//!
//! assert_eq!(config.prefix_scan_limit, 100);
//! assert_eq!(config.default_page_limit, 10);
//! assert!(config.table("doc").is_ok());
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TesseraError};
use crate::highlight::HighlightConfig;
use crate::schema::TableSchema;
use crate::scoring::ScoringConfig;

/// Configuration of an [`Indexer`](crate::indexer::Indexer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// BM25 parameters.
    pub scoring: ScoringConfig,

    /// Maximum number of prefix-expanded rows fetched per query token.
    pub prefix_scan_limit: usize,

    /// Page size of `search` and `aggregate` when the request sets none.
    pub default_page_limit: usize,

    /// Number of hits per aggregation bucket when the request sets none.
    pub default_hits_limit: usize,

    /// Excerpt budget of rendered highlights.
    pub highlight: HighlightConfig,

    /// Schema of every table, by name.
    pub tables: BTreeMap<String, TableSchema>,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        IndexerConfig {
            scoring: ScoringConfig::default(),
            prefix_scan_limit: 5000,
            default_page_limit: 10,
            default_hits_limit: 3,
            highlight: HighlightConfig::default(),
            tables: BTreeMap::new(),
        }
    }
}

impl IndexerConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: IndexerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Builder-style table registration.
    pub fn with_table<S: Into<String>>(mut self, name: S, schema: TableSchema) -> Self {
        self.tables.insert(name.into(), schema);
        self
    }

    /// Look up a table schema.
    pub fn table(&self, name: &str) -> Result<&TableSchema> {
        self.tables
            .get(name)
            .ok_or_else(|| TesseraError::schema(format!("unknown table: {name}")))
    }

    /// Check limits and every field name.
    pub fn validate(&self) -> Result<()> {
        if self.prefix_scan_limit == 0 {
            return Err(TesseraError::invalid_config("prefix_scan_limit must be positive"));
        }
        if self.highlight.max_length == 0 {
            return Err(TesseraError::invalid_config("highlight.max_length must be positive"));
        }
        if !(self.scoring.k1.is_finite() && self.scoring.k1 >= 0.0) {
            return Err(TesseraError::invalid_config("scoring.k1 must be a non-negative number"));
        }
        if !(0.0..=1.0).contains(&self.scoring.b) {
            return Err(TesseraError::invalid_config("scoring.b must lie in [0, 1]"));
        }
        for (name, schema) in &self.tables {
            if name.is_empty() {
                return Err(TesseraError::invalid_config("table names must not be empty"));
            }
            schema.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSchema;

    #[test]
    fn test_defaults() {
        let config = IndexerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, IndexerConfig::default());
        assert_eq!(config.scoring.k1, 1.0);
        assert_eq!(config.highlight.max_prefix, 20);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(IndexerConfig::from_json_str(r#"{"prefix_scan_limit":0}"#).is_err());
        assert!(IndexerConfig::from_json_str(r#"{"scoring":{"b":2.0}}"#).is_err());
        assert!(
            IndexerConfig::from_json_str(r#"{"tables":{"doc":{"a:b":{"type":"string"}}}}"#)
                .is_err()
        );
        assert!(matches!(
            IndexerConfig::from_json_str("not json"),
            Err(TesseraError::Json(_))
        ));
    }

    #[test]
    fn test_unknown_table() {
        let schema = TableSchema::new()
            .with_field("title", FieldSchema::full_text())
            .unwrap();
        let config = IndexerConfig::default().with_table("doc", schema);
        assert!(config.table("doc").is_ok());
        assert!(matches!(config.table("block"), Err(TesseraError::Schema(_))));
    }
}

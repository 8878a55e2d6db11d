//! # Tessera
//!
//! An embedded full-text and structured search index for Rust.
//!
//! ## Features
//!
//! - Pluggable ordered key-value backing stores
//! - Exact-match string, integer and boolean fields
//! - Tokenized full-text fields with BM25 scoring and prefix matching
//! - Boolean, boost, exists and match-all queries
//! - Highlighted excerpts, pagination and value aggregation

pub mod analysis;
pub mod config;
pub mod document;
pub mod error;
pub mod highlight;
pub mod index;
pub mod indexer;
pub mod query;
pub mod schema;
pub mod scoring;
pub mod storage;

pub mod prelude {
    pub use crate::config::IndexerConfig;
    pub use crate::document::{Document, FieldValue};
    pub use crate::error::{Result, TesseraError};
    pub use crate::indexer::{
        AggregateOptions, HighlightRequest, Indexer, Pagination, SearchOptions,
    };
    pub use crate::query::{Match, Occur, Query};
    pub use crate::schema::{FieldSchema, FieldType, TableSchema};
    pub use crate::storage::{IndexStore, MemoryIndexStore};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Storage abstraction layer.
//!
//! The indexer runs against any ordered key-value store that implements
//! [`IndexStore`]. [`MemoryIndexStore`] is the bundled implementation.

pub mod memory;
pub mod traits;

pub use memory::MemoryIndexStore;
pub use traits::{DocNum, IndexStore, KeyRange, PostingRow, RecordRow};

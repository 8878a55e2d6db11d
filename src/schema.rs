//! Schema module: field types and per-table field definitions.

pub mod field;
#[allow(clippy::module_inception)]
pub mod schema;

pub use field::{FieldSchema, FieldType};
pub use schema::TableSchema;

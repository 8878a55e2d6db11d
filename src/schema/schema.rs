//! Per-table schemas.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TesseraError};
use crate::index::key::validate_field_name;
use crate::schema::field::FieldSchema;

/// The fields of one table, in name order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableSchema {
    fields: BTreeMap<String, FieldSchema>,
}

impl TableSchema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field to the schema.
    pub fn add_field<S: Into<String>>(&mut self, name: S, field: FieldSchema) -> Result<()> {
        let name = name.into();
        validate_field_name(&name)?;
        if self.fields.contains_key(&name) {
            return Err(TesseraError::schema(format!("Field '{name}' already exists")));
        }
        self.fields.insert(name, field);
        Ok(())
    }

    /// Builder-style [`TableSchema::add_field`].
    pub fn with_field<S: Into<String>>(mut self, name: S, field: FieldSchema) -> Result<Self> {
        self.add_field(name, field)?;
        Ok(self)
    }

    /// Look up a field.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    /// Look up a field, failing with a schema error when it is missing.
    pub fn require(&self, name: &str) -> Result<&FieldSchema> {
        self.field(name)
            .ok_or_else(|| TesseraError::schema(format!("unknown field: {name}")))
    }

    /// All fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSchema)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Check every field name; used after deserializing.
    pub fn validate(&self) -> Result<()> {
        self.fields.keys().try_for_each(|name| validate_field_name(name))
    }
}

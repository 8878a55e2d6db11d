//! Documents indexed into a table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::document::field_value::FieldValue;

/// A document: an external id plus named, possibly multi-valued fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// External document id
    pub id: String,
    /// Field values keyed by field name
    pub fields: BTreeMap<String, Vec<FieldValue>>,
}

impl Document {
    /// Create a new document without fields.
    pub fn new<S: Into<String>>(id: S) -> Self {
        Document {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Append a value to a field.
    pub fn add_field<S: Into<String>>(&mut self, name: S, value: FieldValue) {
        self.fields.entry(name.into()).or_default().push(value);
    }

    /// Get the values of a field.
    pub fn get(&self, name: &str) -> Option<&[FieldValue]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    /// Check if the document has a field.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Create a builder for constructing documents.
    pub fn builder<S: Into<String>>(id: S) -> DocumentBuilder {
        DocumentBuilder::new(id)
    }
}

/// A builder for constructing documents in a fluent manner.
#[derive(Debug)]
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    /// Create a new document builder.
    pub fn new<S: Into<String>>(id: S) -> Self {
        DocumentBuilder {
            document: Document::new(id),
        }
    }

    /// Add a text value.
    pub fn add_text<S: Into<String>, T: Into<String>>(mut self, name: S, value: T) -> Self {
        self.document.add_field(name, FieldValue::Text(value.into()));
        self
    }

    /// Add several text values to one field.
    pub fn add_texts<S, I, T>(mut self, name: S, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let name = name.into();
        for value in values {
            self.document.add_field(name.clone(), FieldValue::Text(value.into()));
        }
        self
    }

    /// Add an integer value.
    pub fn add_integer<S: Into<String>>(mut self, name: S, value: i64) -> Self {
        self.document.add_field(name, FieldValue::Integer(value));
        self
    }

    /// Add a boolean value.
    pub fn add_boolean<S: Into<String>>(mut self, name: S, value: bool) -> Self {
        self.document.add_field(name, FieldValue::Boolean(value));
        self
    }

    /// Build the document.
    pub fn build(self) -> Document {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let doc = Document::builder("d1")
            .add_text("title", "Hello")
            .add_texts("tags", ["a", "b"])
            .add_integer("n", 3)
            .add_boolean("flag", true)
            .build();

        assert_eq!(doc.id, "d1");
        assert_eq!(doc.get("tags").unwrap().len(), 2);
        assert_eq!(doc.get("n"), Some(&[FieldValue::Integer(3)][..]));
        assert!(doc.has_field("flag"));
        assert!(doc.get("missing").is_none());
    }

    #[test]
    fn test_bincode_round_trip() {
        let doc = Document::builder("d1").add_text("title", "Hello").build();
        let bytes = bincode::serialize(&doc).unwrap();
        let decoded: Document = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, doc);
    }
}

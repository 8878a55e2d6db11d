//! Order-preserving binary keys for inverted index postings.
//!
//! A key is `field ++ gap ++ value`. The gap byte is `:`, so field names may
//! never contain it. Values are encoded so that unsigned lexicographic byte
//! order matches the natural order of the value type:
//!
//! - strings: UTF-8 bytes
//! - int64: 8 bytes big-endian with the sign bit flipped
//! - boolean: a single `0` or `1` byte
//!
//! The whole key space of a field is the half-open range
//! `[IndexKey::for_prefix(field), IndexKey::for_prefix(field).succ())`.

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Result, TesseraError};

/// Separator between the field name and the value.
pub const GAP: u8 = b':';

/// Gap used by the upper bound of a field's key space. Sorts directly after [`GAP`].
pub const UPPER_GAP: u8 = b';';

const SIGN_BIT: u64 = 1 << 63;

/// A `(field, value)` pair in its encoded form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexKey {
    field: Vec<u8>,
    value: Vec<u8>,
    gap: u8,
}

impl IndexKey {
    fn new(field: &str, value: Vec<u8>) -> Self {
        IndexKey {
            field: field.as_bytes().to_vec(),
            value,
            gap: GAP,
        }
    }

    /// Key with an empty value, the lower bound of a field's key space.
    pub fn for_prefix(field: &str) -> Self {
        Self::new(field, Vec::new())
    }

    /// Key for a string value.
    pub fn for_string(field: &str, value: &str) -> Self {
        Self::new(field, value.as_bytes().to_vec())
    }

    /// Key for a signed 64-bit integer.
    pub fn for_int64(field: &str, value: i64) -> Self {
        let mut buf = [0u8; 8];
        BigEndian::write_u64(&mut buf, (value as u64) ^ SIGN_BIT);
        Self::new(field, buf.to_vec())
    }

    /// Key for a boolean.
    pub fn for_boolean(field: &str, value: bool) -> Self {
        Self::new(field, vec![u8::from(value)])
    }

    /// Raw field bytes.
    pub fn field(&self) -> &[u8] {
        &self.field
    }

    /// Raw value bytes.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// The field name as UTF-8.
    pub fn field_name(&self) -> Result<&str> {
        std::str::from_utf8(&self.field)
            .map_err(|e| TesseraError::encoding(format!("field is not UTF-8: {e}")))
    }

    /// The value interpreted as a UTF-8 string.
    pub fn as_string(&self) -> Result<&str> {
        std::str::from_utf8(&self.value)
            .map_err(|e| TesseraError::encoding(format!("value is not UTF-8: {e}")))
    }

    /// The value interpreted as an int64 written by [`IndexKey::for_int64`].
    pub fn as_int64(&self) -> Result<i64> {
        if self.value.len() != 8 {
            return Err(TesseraError::encoding(format!(
                "int64 value must be 8 bytes, got {}",
                self.value.len()
            )));
        }
        Ok((BigEndian::read_u64(&self.value) ^ SIGN_BIT) as i64)
    }

    /// The value interpreted as a boolean written by [`IndexKey::for_boolean`].
    pub fn as_boolean(&self) -> Result<bool> {
        match self.value.as_slice() {
            [0] => Ok(false),
            [1] => Ok(true),
            other => Err(TesseraError::encoding(format!(
                "invalid boolean value bytes: {other:?}"
            ))),
        }
    }

    /// The smallest key greater than every key that starts with this one.
    ///
    /// Non-empty values are carry-incremented from the last byte; bytes that
    /// overflow are dropped rather than wrapped to zero. An empty value (or one
    /// made only of `0xFF`) switches to [`UPPER_GAP`], which bounds the whole
    /// field.
    pub fn succ(&self) -> IndexKey {
        let mut bytes = self.value.clone();
        while let Some(last) = bytes.pop() {
            if last < u8::MAX {
                bytes.push(last + 1);
                return IndexKey {
                    field: self.field.clone(),
                    value: bytes,
                    gap: self.gap,
                };
            }
        }
        IndexKey {
            field: self.field.clone(),
            value: Vec::new(),
            gap: UPPER_GAP,
        }
    }

    /// Encode to the stored byte form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.field.len() + 1 + self.value.len());
        buf.extend_from_slice(&self.field);
        buf.push(self.gap);
        buf.extend_from_slice(&self.value);
        buf
    }

    /// Parse a stored key by splitting at the first gap byte.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let split = bytes
            .iter()
            .position(|&b| b == GAP)
            .ok_or_else(|| TesseraError::encoding("key has no field separator"))?;
        Ok(IndexKey {
            field: bytes[..split].to_vec(),
            value: bytes[split + 1..].to_vec(),
            gap: GAP,
        })
    }
}

/// Check that a field name can be encoded into a key.
pub fn validate_field_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(TesseraError::schema("field name must not be empty"));
    }
    if name.as_bytes().contains(&GAP) {
        return Err(TesseraError::schema(format!(
            "field name {name:?} must not contain ':'"
        )));
    }
    Ok(())
}

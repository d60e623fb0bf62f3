//! The semantic value model shared by every codec.

use std::collections::BTreeMap;

use crate::error::CodecError;

/// A BIT STRING value: data bytes plus the number of significant bits.
/// Bits are big-endian within `data`; bits past `bit_length` in the
/// last byte are expected to be zero.
#[derive(Debug, Clone, PartialEq)]
pub struct BitStringValue {
    pub data: Vec<u8>,
    pub bit_length: usize,
}

/// A decoded or encodable value. `Text` carries both character-string
/// contents and ENUMERATED identifiers; `Record` maps SEQUENCE field
/// names to values; `Choice` pairs the selected alternative with its
/// value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Text(String),
    Bits(BitStringValue),
    Bytes(Vec<u8>),
    Oid(Vec<u64>),
    List(Vec<Value>),
    Record(BTreeMap<String, Value>),
    Choice { key: String, value: Box<Value> },
}

impl Value {
    pub fn record(fields: &[(&str, Value)]) -> Self {
        Value::Record(
            fields
                .iter()
                .map(|(name, value)| ((*name).into(), value.clone()))
                .collect(),
        )
    }

    pub fn choice(key: &str, value: Value) -> Self {
        Value::Choice {
            key: key.into(),
            value: Box::new(value),
        }
    }

    fn mismatch(&self, expected: &str) -> CodecError {
        CodecError::constraint(format!("expected a {expected} value, got {self:?}"))
    }

    pub(crate) fn as_boolean(&self) -> Result<bool, CodecError> {
        match self {
            Value::Boolean(inner) => Ok(*inner),
            other => Err(other.mismatch("BOOLEAN")),
        }
    }

    pub(crate) fn as_integer(&self) -> Result<i64, CodecError> {
        match self {
            Value::Integer(inner) => Ok(*inner),
            other => Err(other.mismatch("INTEGER")),
        }
    }

    pub(crate) fn as_text(&self) -> Result<&str, CodecError> {
        match self {
            Value::Text(inner) => Ok(inner),
            other => Err(other.mismatch("text")),
        }
    }

    pub(crate) fn as_bits(&self) -> Result<&BitStringValue, CodecError> {
        match self {
            Value::Bits(inner) => Ok(inner),
            other => Err(other.mismatch("BIT STRING")),
        }
    }

    pub(crate) fn as_bytes(&self) -> Result<&[u8], CodecError> {
        match self {
            Value::Bytes(inner) => Ok(inner),
            other => Err(other.mismatch("OCTET STRING")),
        }
    }

    pub(crate) fn as_oid(&self) -> Result<&[u64], CodecError> {
        match self {
            Value::Oid(inner) => Ok(inner),
            other => Err(other.mismatch("OBJECT IDENTIFIER")),
        }
    }

    pub(crate) fn as_list(&self) -> Result<&[Value], CodecError> {
        match self {
            Value::List(inner) => Ok(inner),
            other => Err(other.mismatch("SEQUENCE OF")),
        }
    }

    pub(crate) fn as_record(&self) -> Result<&BTreeMap<String, Value>, CodecError> {
        match self {
            Value::Record(inner) => Ok(inner),
            other => Err(other.mismatch("SEQUENCE")),
        }
    }

    pub(crate) fn as_choice(&self) -> Result<(&str, &Value), CodecError> {
        match self {
            Value::Choice { key, value } => Ok((key, value)),
            other => Err(other.mismatch("CHOICE")),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

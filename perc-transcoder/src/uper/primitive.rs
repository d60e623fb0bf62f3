//! Boolean, Integer, Enumerated and Null codecs.

use crate::buffer::BitBuffer;
use crate::error::CodecError;
use crate::value::Value;

use super::lengths::{
    bit_width, decode_length, decode_normally_small, encode_length, encode_normally_small,
    from_signed_bytes_be, from_unsigned_bytes_be, to_signed_bytes_be, to_unsigned_bytes_be,
};
use super::IntegerConstraints;

/// BOOLEAN: one bit, 1 for true.
#[derive(Debug, Clone, Copy)]
pub struct BooleanCodec;

impl BooleanCodec {
    pub(crate) fn encode(&self, buf: &mut BitBuffer, value: &Value) -> Result<(), CodecError> {
        buf.write_bit(value.as_boolean()?);
        Ok(())
    }

    pub(crate) fn decode(&self, buf: &mut BitBuffer) -> Result<Value, CodecError> {
        Ok(Value::Boolean(buf.read_bit()?))
    }
}

/// NULL: zero bits.
#[derive(Debug, Clone, Copy)]
pub struct NullCodec;

impl NullCodec {
    pub(crate) fn encode(&self, _buf: &mut BitBuffer, value: &Value) -> Result<(), CodecError> {
        match value {
            Value::Null => Ok(()),
            other => Err(CodecError::constraint(format!(
                "expected a NULL value, got {other:?}"
            ))),
        }
    }

    pub(crate) fn decode(&self, _buf: &mut BitBuffer) -> Result<Value, CodecError> {
        Ok(Value::Null)
    }
}

/// INTEGER with the four constraint shapes: constrained (both
/// bounds), semi-constrained (minimum only), unconstrained, and any
/// of those marked extensible.
#[derive(Debug, Clone, Copy)]
pub struct IntegerCodec {
    constraints: IntegerConstraints,
}

impl IntegerCodec {
    pub fn new(constraints: IntegerConstraints) -> Self {
        Self { constraints }
    }

    fn in_root(&self, value: i64) -> bool {
        self.constraints.min.map_or(true, |min| value >= min)
            && self.constraints.max.map_or(true, |max| value <= max)
    }

    pub(crate) fn encode(&self, buf: &mut BitBuffer, value: &Value) -> Result<(), CodecError> {
        let value = value.as_integer()?;
        let in_root = self.in_root(value);
        if self.constraints.extensible {
            buf.write_bit(!in_root);
            if !in_root {
                return encode_unconstrained(buf, value);
            }
        } else if !in_root {
            return Err(CodecError::constraint(format!(
                "value {value} violates the range constraint {:?}..{:?}",
                self.constraints.min, self.constraints.max
            )));
        }
        match (self.constraints.min, self.constraints.max) {
            (Some(min), Some(max)) => {
                let range = (max as i128 - min as i128 + 1) as u128;
                let width = bit_width(range);
                if width > 0 {
                    buf.write_bits((value as i128 - min as i128) as u128, width)?;
                }
                Ok(())
            }
            (Some(min), None) => {
                let bytes = to_unsigned_bytes_be((value as i128 - min as i128) as u128);
                encode_length(buf, bytes.len(), |buf, range| {
                    buf.write_octets(&bytes[range]);
                    Ok(())
                })
            }
            _ => encode_unconstrained(buf, value),
        }
    }

    pub(crate) fn decode(&self, buf: &mut BitBuffer) -> Result<Value, CodecError> {
        if self.constraints.extensible && buf.read_bit()? {
            return decode_unconstrained(buf).map(Value::Integer);
        }
        let value = match (self.constraints.min, self.constraints.max) {
            (Some(min), Some(max)) => {
                let range = (max as i128 - min as i128 + 1) as u128;
                let width = bit_width(range);
                let offset = if width > 0 { buf.read_bits(width)? } else { 0 };
                let value = min as i128 + offset as i128;
                if value > max as i128 {
                    return Err(CodecError::wire(format!(
                        "decoded value {value} exceeds the constrained maximum {max}"
                    )));
                }
                value as i64
            }
            (Some(min), None) => {
                let mut bytes = Vec::new();
                decode_length(buf, |buf, count| {
                    bytes.extend(buf.read_octets(count)?);
                    Ok(())
                })?;
                let offset = from_unsigned_bytes_be(&bytes)?;
                into_window(min as i128 + offset as i128)?
            }
            (None, max) => {
                let value = decode_unconstrained(buf)?;
                if let Some(max) = max {
                    if value > max {
                        return Err(CodecError::wire(format!(
                            "decoded value {value} exceeds the constrained maximum {max}"
                        )));
                    }
                }
                value
            }
        };
        Ok(Value::Integer(value))
    }
}

fn encode_unconstrained(buf: &mut BitBuffer, value: i64) -> Result<(), CodecError> {
    let bytes = to_signed_bytes_be(value as i128);
    encode_length(buf, bytes.len(), |buf, range| {
        buf.write_octets(&bytes[range]);
        Ok(())
    })
}

fn decode_unconstrained(buf: &mut BitBuffer) -> Result<i64, CodecError> {
    let mut bytes = Vec::new();
    decode_length(buf, |buf, count| {
        bytes.extend(buf.read_octets(count)?);
        Ok(())
    })?;
    into_window(from_signed_bytes_be(&bytes)?)
}

fn into_window(value: i128) -> Result<i64, CodecError> {
    i64::try_from(value)
        .map_err(|_| CodecError::wire(format!("value {value} exceeds the 64-bit integer window")))
}

/// ENUMERATED: root values are numbered in declaration order and
/// encoded as a constrained whole number; extension values get the
/// extension bit plus a normally-small index.
#[derive(Debug, Clone)]
pub struct EnumeratedCodec {
    root: Vec<String>,
    extensions: Vec<String>,
    extensible: bool,
}

impl EnumeratedCodec {
    pub fn new(values: Vec<String>, extension_values: Option<Vec<String>>) -> Self {
        let extensible = extension_values.is_some();
        Self {
            root: values,
            extensions: extension_values.unwrap_or_default(),
            extensible,
        }
    }

    fn root_width(&self) -> usize {
        bit_width(self.root.len() as u128)
    }

    pub(crate) fn encode(&self, buf: &mut BitBuffer, value: &Value) -> Result<(), CodecError> {
        let name = value.as_text()?;
        if let Some(index) = self.root.iter().position(|v| v == name) {
            if self.extensible {
                buf.write_bit(false);
            }
            let width = self.root_width();
            if width > 0 {
                buf.write_bits(index as u128, width)?;
            }
            return Ok(());
        }
        if let Some(index) = self.extensions.iter().position(|v| v == name) {
            buf.write_bit(true);
            return encode_normally_small(buf, index);
        }
        Err(CodecError::constraint(format!(
            "unknown enumerated value '{name}'"
        )))
    }

    pub(crate) fn decode(&self, buf: &mut BitBuffer) -> Result<Value, CodecError> {
        if self.extensible && buf.read_bit()? {
            let index = decode_normally_small(buf)?;
            return self
                .extensions
                .get(index)
                .map(|name| Value::Text(name.clone()))
                .ok_or_else(|| {
                    CodecError::wire(format!("unknown enumeration extension index {index}"))
                });
        }
        let width = self.root_width();
        let index = if width > 0 { buf.read_bits(width)? } else { 0 } as usize;
        self.root
            .get(index)
            .map(|name| Value::Text(name.clone()))
            .ok_or_else(|| CodecError::wire(format!("enumeration index {index} is out of range")))
    }
}

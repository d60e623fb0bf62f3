//! SEQUENCE, SEQUENCE OF and CHOICE codecs, including extension
//! groups carried as open types.

use std::collections::BTreeMap;

use crate::buffer::BitBuffer;
use crate::error::{CodecError, CodecErrorType};
use crate::node::{CodecKind, DecodedField, DecodedNode, DecodedValue, Metadata};
use crate::value::Value;

use super::lengths::{
    bit_width, decode_length, decode_normally_small, decode_size, encode_length,
    encode_normally_small, encode_size,
};
use super::{Codec, SizeConstraints};

/// Key under which an unknown CHOICE extension alternative is
/// surfaced, with the raw open-type octets as its value.
pub const UNKNOWN_ALTERNATIVE: &str = "<unknown>";

/// Wraps a field encoding as an open type: the payload is padded to
/// whole bytes and framed with a length determinant. An empty payload
/// becomes a single zero octet.
fn encode_open_type(
    buf: &mut BitBuffer,
    codec: &Codec,
    value: &Value,
) -> Result<(), CodecError> {
    let mut inner = BitBuffer::new();
    codec.encode_value(&mut inner, value)?;
    let mut bytes = inner.to_bytes();
    if bytes.is_empty() {
        bytes.push(0);
    }
    encode_length(buf, bytes.len(), |buf, range| {
        buf.write_octets(&bytes[range]);
        Ok(())
    })
}

/// Reads the framed octets of an open type without interpreting them.
fn read_open_type(buf: &mut BitBuffer) -> Result<Vec<u8>, CodecError> {
    let mut bytes = Vec::new();
    decode_length(buf, |buf, count| {
        bytes.extend(buf.read_octets(count)?);
        Ok(())
    })?;
    Ok(bytes)
}

/// Decodes an open-type payload with the field's codec; the padding
/// bits past the content are discarded. Bit offsets inside the
/// returned node are relative to the payload.
fn decode_open_field(codec: &Codec, bytes: &[u8]) -> Result<DecodedNode, CodecError> {
    let mut inner = BitBuffer::from_bytes(bytes);
    codec.decode_node(&mut inner).map_err(|error| {
        if error.kind == CodecErrorType::BufferUnderrun {
            CodecError::wire("open type content exceeds its framed length")
        } else {
            error
        }
    })
}

/// A single SEQUENCE field: codec plus presence semantics.
#[derive(Debug, Clone)]
pub struct SequenceField {
    pub name: String,
    pub codec: Codec,
    pub optional: bool,
    pub default: Option<Value>,
}

impl SequenceField {
    pub fn new(name: &str, codec: Codec) -> Self {
        Self {
            name: name.into(),
            codec,
            optional: false,
            default: None,
        }
    }

    pub fn optional(name: &str, codec: Codec) -> Self {
        Self {
            name: name.into(),
            codec,
            optional: true,
            default: None,
        }
    }

    pub fn with_default(name: &str, codec: Codec, default: Value) -> Self {
        Self {
            name: name.into(),
            codec,
            optional: true,
            default: Some(default),
        }
    }

    fn has_presence_bit(&self) -> bool {
        self.optional || self.default.is_some()
    }

    /// The value to put on the wire, if any. A supplied value equal to
    /// the field's default is elided.
    fn effective_value<'a>(&self, fields: &'a BTreeMap<String, Value>) -> Option<&'a Value> {
        let value = fields.get(&self.name)?;
        match &self.default {
            Some(default) if value == default => None,
            _ => Some(value),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SequenceCodec {
    root: Vec<SequenceField>,
    extensions: Vec<SequenceField>,
    extensible: bool,
}

impl SequenceCodec {
    pub fn new(root: Vec<SequenceField>, extensions: Option<Vec<SequenceField>>) -> Self {
        let extensible = extensions.is_some();
        Self {
            root,
            extensions: extensions.unwrap_or_default(),
            extensible,
        }
    }

    fn field_named(&self, name: &str) -> bool {
        self.root
            .iter()
            .chain(self.extensions.iter())
            .any(|field| field.name == name)
    }

    pub(crate) fn encode(&self, buf: &mut BitBuffer, value: &Value) -> Result<(), CodecError> {
        let fields = value.as_record()?;
        for name in fields.keys() {
            if !self.field_named(name) {
                return Err(CodecError::constraint(format!("unknown field '{name}'")));
            }
        }
        let extensions_present = self
            .extensions
            .iter()
            .any(|field| field.effective_value(fields).is_some());
        if self.extensible {
            buf.write_bit(extensions_present);
        }
        for field in &self.root {
            if field.has_presence_bit() {
                buf.write_bit(field.effective_value(fields).is_some());
            }
        }
        for field in &self.root {
            match field.effective_value(fields) {
                Some(value) => field
                    .codec
                    .encode_value(buf, value)
                    .map_err(|error| error.at(&field.name))?,
                None if field.has_presence_bit() => {}
                None => {
                    return Err(CodecError::constraint(format!(
                        "missing mandatory field '{}'",
                        field.name
                    )));
                }
            }
        }
        if extensions_present {
            encode_normally_small(buf, self.extensions.len() - 1)?;
            for field in &self.extensions {
                buf.write_bit(field.effective_value(fields).is_some());
            }
            for field in &self.extensions {
                if let Some(value) = field.effective_value(fields) {
                    encode_open_type(buf, &field.codec, value)
                        .map_err(|error| error.at(&field.name))?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn decode_fields(&self, buf: &mut BitBuffer) -> Result<DecodedValue, CodecError> {
        let extensions_present = self.extensible && buf.read_bit()?;
        let mut presence = Vec::with_capacity(self.root.len());
        for field in &self.root {
            if field.has_presence_bit() {
                presence.push(buf.read_bit()?);
            } else {
                presence.push(true);
            }
        }
        let mut fields = BTreeMap::new();
        for (field, present) in self.root.iter().zip(presence) {
            let decoded = if present {
                let node = field
                    .codec
                    .decode_node(buf)
                    .map_err(|error| error.at(&field.name))?;
                DecodedField {
                    node,
                    present: true,
                    is_default: false,
                }
            } else {
                absent_field(field, buf.cursor())
            };
            fields.insert(field.name.clone(), decoded);
        }
        if extensions_present {
            let slots = decode_normally_small(buf)? + 1;
            let mut bitmap = Vec::with_capacity(slots);
            for _ in 0..slots {
                bitmap.push(buf.read_bit()?);
            }
            for (index, bit) in bitmap.iter().enumerate() {
                match self.extensions.get(index) {
                    Some(field) => {
                        let decoded = if *bit {
                            let bytes = read_open_type(buf)?;
                            let node = decode_open_field(&field.codec, &bytes)
                                .map_err(|error| error.at(&field.name))?;
                            DecodedField {
                                node,
                                present: true,
                                is_default: false,
                            }
                        } else {
                            absent_field(field, buf.cursor())
                        };
                        fields.insert(field.name.clone(), decoded);
                    }
                    // Unknown extension slot: skip the payload.
                    None if *bit => {
                        read_open_type(buf)?;
                    }
                    None => {}
                }
            }
            for field in self.extensions.iter().skip(bitmap.len()) {
                fields.insert(field.name.clone(), absent_field(field, buf.cursor()));
            }
        } else {
            for field in &self.extensions {
                fields.insert(field.name.clone(), absent_field(field, buf.cursor()));
            }
        }
        Ok(DecodedValue::Sequence(fields))
    }
}

/// The node recorded for a declared field that is absent from the
/// wire. DEFAULT fields are reinstated with their default value.
fn absent_field(field: &SequenceField, bit_offset: usize) -> DecodedField {
    match &field.default {
        Some(default) => DecodedField {
            node: DecodedNode::placeholder(field.codec.kind(), bit_offset, default.clone()),
            present: false,
            is_default: true,
        },
        None => DecodedField {
            node: DecodedNode::placeholder(field.codec.kind(), bit_offset, Value::Null),
            present: false,
            is_default: false,
        },
    }
}

#[derive(Debug, Clone)]
pub struct SequenceOfCodec {
    item: Box<Codec>,
    size: SizeConstraints,
}

impl SequenceOfCodec {
    pub fn new(item: Codec, size: SizeConstraints) -> Self {
        Self {
            item: Box::new(item),
            size,
        }
    }

    pub(crate) fn encode(&self, buf: &mut BitBuffer, value: &Value) -> Result<(), CodecError> {
        let items = value.as_list()?;
        encode_size(buf, &self.size, items.len(), |buf, range| {
            for index in range {
                self.item
                    .encode_value(buf, &items[index])
                    .map_err(|error| error.at(&format!("[{index}]")))?;
            }
            Ok(())
        })
    }

    pub(crate) fn decode_items(&self, buf: &mut BitBuffer) -> Result<DecodedValue, CodecError> {
        let mut items = Vec::new();
        decode_size(buf, &self.size, |buf, count| {
            for _ in 0..count {
                let node = self
                    .item
                    .decode_node(buf)
                    .map_err(|error| error.at(&format!("[{}]", items.len())))?;
                items.push(node);
            }
            Ok(())
        })?;
        Ok(DecodedValue::SequenceOf(items))
    }
}

/// A single CHOICE alternative.
#[derive(Debug, Clone)]
pub struct ChoiceAlternative {
    pub name: String,
    pub codec: Codec,
}

impl ChoiceAlternative {
    pub fn new(name: &str, codec: Codec) -> Self {
        Self {
            name: name.into(),
            codec,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChoiceCodec {
    root: Vec<ChoiceAlternative>,
    extensions: Vec<ChoiceAlternative>,
    extensible: bool,
}

impl ChoiceCodec {
    pub fn new(root: Vec<ChoiceAlternative>, extensions: Option<Vec<ChoiceAlternative>>) -> Self {
        let extensible = extensions.is_some();
        Self {
            root,
            extensions: extensions.unwrap_or_default(),
            extensible,
        }
    }

    fn root_width(&self) -> usize {
        bit_width(self.root.len() as u128)
    }

    pub(crate) fn encode(&self, buf: &mut BitBuffer, value: &Value) -> Result<(), CodecError> {
        let (key, inner) = value.as_choice()?;
        if let Some(index) = self.root.iter().position(|alt| alt.name == key) {
            if self.extensible {
                buf.write_bit(false);
            }
            let width = self.root_width();
            if width > 0 {
                buf.write_bits(index as u128, width)?;
            }
            return self.root[index]
                .codec
                .encode_value(buf, inner)
                .map_err(|error| error.at(key));
        }
        if let Some(index) = self.extensions.iter().position(|alt| alt.name == key) {
            buf.write_bit(true);
            encode_normally_small(buf, index)?;
            return encode_open_type(buf, &self.extensions[index].codec, inner)
                .map_err(|error| error.at(key));
        }
        Err(CodecError::constraint(format!(
            "unknown choice alternative '{key}'"
        )))
    }

    pub(crate) fn decode_alternative(
        &self,
        buf: &mut BitBuffer,
    ) -> Result<DecodedValue, CodecError> {
        if self.extensible && buf.read_bit()? {
            let index = decode_normally_small(buf)?;
            let bytes = read_open_type(buf)?;
            return match self.extensions.get(index) {
                Some(alternative) => {
                    let node = decode_open_field(&alternative.codec, &bytes)
                        .map_err(|error| error.at(&alternative.name))?;
                    Ok(DecodedValue::Choice {
                        key: alternative.name.clone(),
                        node: Box::new(node),
                    })
                }
                // An alternative added after this schema was issued:
                // surface the raw payload under the reserved key.
                None => {
                    let bit_length = bytes.len() * 8;
                    Ok(DecodedValue::Choice {
                        key: UNKNOWN_ALTERNATIVE.into(),
                        node: Box::new(DecodedNode {
                            value: DecodedValue::Primitive(Value::Bytes(bytes.clone())),
                            meta: Metadata {
                                kind: CodecKind::OctetString,
                                bit_offset: 0,
                                bit_length,
                                raw_bytes: bytes,
                            },
                        }),
                    })
                }
            };
        }
        let width = self.root_width();
        let index = if width > 0 { buf.read_bits(width)? } else { 0 } as usize;
        let alternative = self.root.get(index).ok_or_else(|| {
            CodecError::wire(format!("choice index {index} is out of range"))
        })?;
        let node = alternative
            .codec
            .decode_node(buf)
            .map_err(|error| error.at(&alternative.name))?;
        Ok(DecodedValue::Choice {
            key: alternative.name.clone(),
            node: Box::new(node),
        })
    }
}

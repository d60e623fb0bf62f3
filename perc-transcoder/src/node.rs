//! Decoded nodes: values annotated with their bit range and a
//! byte-exact copy of the source region.
//!
//! The metadata makes it possible to extract the raw bytes of any
//! substructure of a decoded document (for example the region covered
//! by a signature) without re-encoding anything.

use std::collections::BTreeMap;

use crate::value::Value;

/// Which codec produced a node. Stored as a plain tag so nodes stay
/// cheap to clone and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecKind {
    Boolean,
    Integer,
    Enumerated,
    BitString,
    OctetString,
    CharacterString,
    ObjectIdentifier,
    Null,
    Sequence,
    SequenceOf,
    Choice,
}

/// Source-region metadata of a decoded node. `raw_bytes` holds
/// exactly `ceil(bit_length / 8)` bytes covering the node's bits,
/// starting at bit 7 of the first byte, with trailing bits zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub kind: CodecKind,
    pub bit_offset: usize,
    pub bit_length: usize,
    pub raw_bytes: Vec<u8>,
}

/// A decoded value together with its metadata. Composite nodes hold
/// child nodes rather than plain values.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedNode {
    pub value: DecodedValue,
    pub meta: Metadata,
}

impl DecodedNode {
    /// A zero-width node standing in for a field that was absent from
    /// the wire.
    pub(crate) fn placeholder(kind: CodecKind, bit_offset: usize, value: Value) -> Self {
        DecodedNode {
            value: DecodedValue::Primitive(value),
            meta: Metadata {
                kind,
                bit_offset,
                bit_length: 0,
                raw_bytes: Vec::new(),
            },
        }
    }
}

/// A SEQUENCE field entry: the child node plus presence flags.
/// `present` is false for fields that were syntactically absent;
/// `is_default` marks DEFAULT fields whose value was reinstated.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedField {
    pub node: DecodedNode,
    pub present: bool,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    Primitive(Value),
    Sequence(BTreeMap<String, DecodedField>),
    SequenceOf(Vec<DecodedNode>),
    Choice { key: String, node: Box<DecodedNode> },
}

/// Walks a decoded-node tree and yields the plain value an unadorned
/// decode would have returned. Absent optional fields are omitted;
/// reinstated defaults are kept.
pub fn strip_metadata(node: &DecodedNode) -> Value {
    match &node.value {
        DecodedValue::Primitive(value) => value.clone(),
        DecodedValue::Sequence(fields) => Value::Record(
            fields
                .iter()
                .filter(|(_, field)| field.present || field.is_default)
                .map(|(name, field)| (name.clone(), strip_metadata(&field.node)))
                .collect(),
        ),
        DecodedValue::SequenceOf(items) => {
            Value::List(items.iter().map(strip_metadata).collect())
        }
        DecodedValue::Choice { key, node } => Value::Choice {
            key: key.clone(),
            value: Box::new(strip_metadata(node)),
        },
    }
}

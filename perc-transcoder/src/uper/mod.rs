//! The PER-unaligned codecs. A [`Codec`] is built once, either
//! directly from a constraints record or through the schema builder,
//! and is then shared freely across encode and decode calls; all
//! state lives in the [`BitBuffer`] passed to each operation.

pub(crate) mod lengths;

mod composite;
mod primitive;
mod string;

pub use composite::{
    ChoiceAlternative, ChoiceCodec, SequenceCodec, SequenceField, SequenceOfCodec,
    UNKNOWN_ALTERNATIVE,
};
pub use primitive::{BooleanCodec, EnumeratedCodec, IntegerCodec, NullCodec};
pub use string::{
    BitStringCodec, CharacterStringCodec, ObjectIdentifierCodec, OctetStringCodec, StringKind,
};

use crate::buffer::BitBuffer;
use crate::builder::ReferenceCodec;
use crate::error::CodecError;
use crate::node::{strip_metadata, CodecKind, DecodedNode, DecodedValue, Metadata};
use crate::value::Value;

/// Constraints of an INTEGER codec. Both bounds present gives a
/// constrained whole number, only `min` a semi-constrained one,
/// neither an unconstrained one; `extensible` adds the extension bit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegerConstraints {
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub extensible: bool,
}

/// Size constraints of a container codec (strings, SEQUENCE OF).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeConstraints {
    pub fixed: Option<usize>,
    pub min: Option<usize>,
    pub max: Option<usize>,
    pub extensible: bool,
}

impl SizeConstraints {
    pub fn fixed(size: usize) -> Self {
        Self {
            fixed: Some(size),
            ..Self::default()
        }
    }

    pub fn range(min: usize, max: usize) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ..Self::default()
        }
    }

    /// Whether `count` satisfies the root constraint.
    pub(crate) fn contains(&self, count: usize) -> bool {
        if let Some(fixed) = self.fixed {
            return count == fixed;
        }
        self.min.map_or(true, |min| count >= min) && self.max.map_or(true, |max| count <= max)
    }
}

/// A compiled codec for one ASN.1 type. Immutable once constructed.
#[derive(Debug, Clone)]
pub enum Codec {
    Boolean(BooleanCodec),
    Integer(IntegerCodec),
    Enumerated(EnumeratedCodec),
    BitString(BitStringCodec),
    OctetString(OctetStringCodec),
    CharacterString(CharacterStringCodec),
    ObjectIdentifier(ObjectIdentifierCodec),
    Null(NullCodec),
    Sequence(SequenceCodec),
    SequenceOf(SequenceOfCodec),
    Choice(ChoiceCodec),
    Reference(ReferenceCodec),
}

impl Codec {
    pub fn boolean() -> Self {
        Codec::Boolean(BooleanCodec)
    }

    pub fn null() -> Self {
        Codec::Null(NullCodec)
    }

    pub fn integer(constraints: IntegerConstraints) -> Self {
        Codec::Integer(IntegerCodec::new(constraints))
    }

    pub fn enumerated(values: Vec<String>, extension_values: Option<Vec<String>>) -> Self {
        Codec::Enumerated(EnumeratedCodec::new(values, extension_values))
    }

    pub fn bit_string(size: SizeConstraints) -> Self {
        Codec::BitString(BitStringCodec::new(size))
    }

    pub fn octet_string(size: SizeConstraints) -> Self {
        Codec::OctetString(OctetStringCodec::new(size))
    }

    pub fn character_string(
        kind: StringKind,
        size: SizeConstraints,
        alphabet: Option<&str>,
    ) -> Result<Self, CodecError> {
        Ok(Codec::CharacterString(CharacterStringCodec::new(
            kind, size, alphabet,
        )?))
    }

    pub fn object_identifier() -> Self {
        Codec::ObjectIdentifier(ObjectIdentifierCodec)
    }

    pub fn sequence(root: Vec<SequenceField>, extensions: Option<Vec<SequenceField>>) -> Self {
        Codec::Sequence(SequenceCodec::new(root, extensions))
    }

    pub fn sequence_of(item: Codec, size: SizeConstraints) -> Self {
        Codec::SequenceOf(SequenceOfCodec::new(item, size))
    }

    pub fn choice(
        root: Vec<ChoiceAlternative>,
        extensions: Option<Vec<ChoiceAlternative>>,
    ) -> Self {
        Codec::Choice(ChoiceCodec::new(root, extensions))
    }

    pub fn kind(&self) -> CodecKind {
        match self {
            Codec::Boolean(_) => CodecKind::Boolean,
            Codec::Integer(_) => CodecKind::Integer,
            Codec::Enumerated(_) => CodecKind::Enumerated,
            Codec::BitString(_) => CodecKind::BitString,
            Codec::OctetString(_) => CodecKind::OctetString,
            Codec::CharacterString(_) => CodecKind::CharacterString,
            Codec::ObjectIdentifier(_) => CodecKind::ObjectIdentifier,
            Codec::Null(_) => CodecKind::Null,
            Codec::Sequence(_) => CodecKind::Sequence,
            Codec::SequenceOf(_) => CodecKind::SequenceOf,
            Codec::Choice(_) => CodecKind::Choice,
            // The kind of an unresolved reference is unknowable; an
            // unset slot surfaces as an error in decode instead.
            Codec::Reference(reference) => reference
                .peek()
                .map(Codec::kind)
                .unwrap_or(CodecKind::Null),
        }
    }

    /// Appends the encoding of `value` to `buf`. On error the buffer
    /// is truncated back to its bit-length before the call.
    pub fn encode(&self, buf: &mut BitBuffer, value: &Value) -> Result<(), CodecError> {
        let mark = buf.bit_length();
        self.encode_value(buf, value).map_err(|error| {
            buf.truncate(mark);
            error
        })
    }

    /// Decodes one value from `buf`, advancing its cursor. On error
    /// the cursor is restored to its position before the call.
    pub fn decode(&self, buf: &mut BitBuffer) -> Result<Value, CodecError> {
        let mark = buf.cursor();
        self.decode_value(buf).map_err(|error| {
            buf.seek(mark);
            error
        })
    }

    /// Like [`Codec::decode`], but annotates the result (and every
    /// substructure) with bit offsets, bit lengths and raw byte
    /// copies of the source regions.
    pub fn decode_with_metadata(&self, buf: &mut BitBuffer) -> Result<DecodedNode, CodecError> {
        let mark = buf.cursor();
        self.decode_node(buf).map_err(|error| {
            buf.seek(mark);
            error
        })
    }

    pub(crate) fn encode_value(&self, buf: &mut BitBuffer, value: &Value) -> Result<(), CodecError> {
        match self {
            Codec::Boolean(codec) => codec.encode(buf, value),
            Codec::Integer(codec) => codec.encode(buf, value),
            Codec::Enumerated(codec) => codec.encode(buf, value),
            Codec::BitString(codec) => codec.encode(buf, value),
            Codec::OctetString(codec) => codec.encode(buf, value),
            Codec::CharacterString(codec) => codec.encode(buf, value),
            Codec::ObjectIdentifier(codec) => codec.encode(buf, value),
            Codec::Null(codec) => codec.encode(buf, value),
            Codec::Sequence(codec) => codec.encode(buf, value),
            Codec::SequenceOf(codec) => codec.encode(buf, value),
            Codec::Choice(codec) => codec.encode(buf, value),
            Codec::Reference(reference) => reference.resolve()?.encode_value(buf, value),
        }
    }

    pub(crate) fn decode_value(&self, buf: &mut BitBuffer) -> Result<Value, CodecError> {
        match self {
            Codec::Boolean(codec) => codec.decode(buf),
            Codec::Integer(codec) => codec.decode(buf),
            Codec::Enumerated(codec) => codec.decode(buf),
            Codec::BitString(codec) => codec.decode(buf),
            Codec::OctetString(codec) => codec.decode(buf),
            Codec::CharacterString(codec) => codec.decode(buf),
            Codec::ObjectIdentifier(codec) => codec.decode(buf),
            Codec::Null(codec) => codec.decode(buf),
            // Composite decoding exists once, on the metadata path;
            // the plain value is its stripped projection.
            Codec::Sequence(_) | Codec::SequenceOf(_) | Codec::Choice(_) => {
                Ok(strip_metadata(&self.decode_node(buf)?))
            }
            Codec::Reference(reference) => reference.resolve()?.decode_value(buf),
        }
    }

    pub(crate) fn decode_node(&self, buf: &mut BitBuffer) -> Result<DecodedNode, CodecError> {
        if let Codec::Reference(reference) = self {
            return reference.resolve()?.decode_node(buf);
        }
        let start = buf.cursor();
        let value = match self {
            Codec::Sequence(codec) => codec.decode_fields(buf)?,
            Codec::SequenceOf(codec) => codec.decode_items(buf)?,
            Codec::Choice(codec) => codec.decode_alternative(buf)?,
            _ => DecodedValue::Primitive(self.decode_value(buf)?),
        };
        let end = buf.cursor();
        Ok(DecodedNode {
            value,
            meta: Metadata {
                kind: self.kind(),
                bit_offset: start,
                bit_length: end - start,
                raw_bytes: buf.extract_bytes(start, end - start),
            },
        })
    }
}

//! BIT STRING, OCTET STRING, character string and OBJECT IDENTIFIER
//! codecs.

use std::collections::BTreeMap;

use crate::buffer::BitBuffer;
use crate::error::CodecError;
use crate::value::{BitStringValue, Value};

use super::lengths::{bit_width, decode_length, decode_size, encode_length, encode_size};
use super::SizeConstraints;

/// BIT STRING: size determinant, then the bits verbatim.
#[derive(Debug, Clone, Copy)]
pub struct BitStringCodec {
    size: SizeConstraints,
}

impl BitStringCodec {
    pub fn new(size: SizeConstraints) -> Self {
        Self { size }
    }

    pub(crate) fn encode(&self, buf: &mut BitBuffer, value: &Value) -> Result<(), CodecError> {
        let bits = value.as_bits()?;
        if bits.data.len() * 8 < bits.bit_length {
            return Err(CodecError::constraint(format!(
                "bit string data holds fewer than its {} declared bits",
                bits.bit_length
            )));
        }
        encode_size(buf, &self.size, bits.bit_length, |buf, range| {
            for index in range {
                buf.write_bit(bits.data[index / 8] >> (7 - index % 8) & 1 == 1);
            }
            Ok(())
        })
    }

    pub(crate) fn decode(&self, buf: &mut BitBuffer) -> Result<Value, CodecError> {
        let mut bits = BitBuffer::new();
        let bit_length = decode_size(buf, &self.size, |buf, count| {
            for _ in 0..count {
                let bit = buf.read_bit()?;
                bits.write_bit(bit);
            }
            Ok(())
        })?;
        Ok(Value::Bits(BitStringValue {
            data: bits.to_bytes(),
            bit_length,
        }))
    }
}

/// OCTET STRING: size determinant over the byte count, then the bytes
/// with no alignment padding.
#[derive(Debug, Clone, Copy)]
pub struct OctetStringCodec {
    size: SizeConstraints,
}

impl OctetStringCodec {
    pub fn new(size: SizeConstraints) -> Self {
        Self { size }
    }

    pub(crate) fn encode(&self, buf: &mut BitBuffer, value: &Value) -> Result<(), CodecError> {
        let bytes = value.as_bytes()?;
        encode_size(buf, &self.size, bytes.len(), |buf, range| {
            buf.write_octets(&bytes[range]);
            Ok(())
        })
    }

    pub(crate) fn decode(&self, buf: &mut BitBuffer) -> Result<Value, CodecError> {
        let mut bytes = Vec::new();
        decode_size(buf, &self.size, |buf, count| {
            bytes.extend(buf.read_octets(count)?);
            Ok(())
        })?;
        Ok(Value::Bytes(bytes))
    }
}

/// The character string flavors. IA5String and VisibleString compact
/// to seven bits per character; UTF8String is framed by its UTF-8 byte
/// length with no per-character compaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind {
    Ia5,
    Visible,
    Utf8,
}

/// A permitted alphabet: index table and reverse lookup, both derived
/// once at construction.
#[derive(Debug, Clone)]
struct Alphabet {
    by_index: Vec<char>,
    by_char: BTreeMap<char, usize>,
    width: usize,
}

impl Alphabet {
    fn new(characters: &str) -> Result<Self, CodecError> {
        let by_index: Vec<char> = characters.chars().collect();
        if by_index.is_empty() {
            return Err(CodecError::schema("permitted alphabet is empty"));
        }
        let mut by_char = BTreeMap::new();
        for (index, character) in by_index.iter().enumerate() {
            if by_char.insert(*character, index).is_some() {
                return Err(CodecError::schema(format!(
                    "duplicate character '{character}' in permitted alphabet"
                )));
            }
        }
        let width = bit_width(by_index.len() as u128);
        Ok(Self {
            by_index,
            by_char,
            width,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CharacterStringCodec {
    kind: StringKind,
    size: SizeConstraints,
    alphabet: Option<Alphabet>,
}

impl CharacterStringCodec {
    pub fn new(
        kind: StringKind,
        size: SizeConstraints,
        alphabet: Option<&str>,
    ) -> Result<Self, CodecError> {
        if kind == StringKind::Utf8 && alphabet.is_some() {
            return Err(CodecError::schema(
                "UTF8String does not support a permitted alphabet",
            ));
        }
        Ok(Self {
            kind,
            size,
            alphabet: alphabet.map(Alphabet::new).transpose()?,
        })
    }

    pub(crate) fn encode(&self, buf: &mut BitBuffer, value: &Value) -> Result<(), CodecError> {
        let text = value.as_text()?;
        if self.kind == StringKind::Utf8 {
            let bytes = text.as_bytes();
            return encode_size(buf, &self.size, bytes.len(), |buf, range| {
                buf.write_octets(&bytes[range]);
                Ok(())
            });
        }
        let characters: Vec<char> = text.chars().collect();
        encode_size(buf, &self.size, characters.len(), |buf, range| {
            for index in range {
                self.encode_character(buf, characters[index])?;
            }
            Ok(())
        })
    }

    fn encode_character(&self, buf: &mut BitBuffer, character: char) -> Result<(), CodecError> {
        if let Some(alphabet) = &self.alphabet {
            let index = alphabet.by_char.get(&character).ok_or_else(|| {
                CodecError::constraint(format!(
                    "character '{character}' is not in the permitted alphabet"
                ))
            })?;
            return buf.write_bits(*index as u128, alphabet.width);
        }
        let code = character as u32;
        match self.kind {
            StringKind::Ia5 if code <= 0x7F => buf.write_bits(code as u128, 7),
            StringKind::Visible if (0x20..=0x7E).contains(&code) => {
                buf.write_bits(code as u128, 7)
            }
            _ => Err(CodecError::constraint(format!(
                "character '{character}' is outside the string type's character set"
            ))),
        }
    }

    pub(crate) fn decode(&self, buf: &mut BitBuffer) -> Result<Value, CodecError> {
        if self.kind == StringKind::Utf8 {
            let mut bytes = Vec::new();
            decode_size(buf, &self.size, |buf, count| {
                bytes.extend(buf.read_octets(count)?);
                Ok(())
            })?;
            return String::from_utf8(bytes)
                .map(Value::Text)
                .map_err(|_| CodecError::wire("string contents are not valid UTF-8"));
        }
        let mut text = String::new();
        decode_size(buf, &self.size, |buf, count| {
            for _ in 0..count {
                let character = self.decode_character(buf)?;
                text.push(character);
            }
            Ok(())
        })?;
        Ok(Value::Text(text))
    }

    fn decode_character(&self, buf: &mut BitBuffer) -> Result<char, CodecError> {
        if let Some(alphabet) = &self.alphabet {
            let index = buf.read_bits(alphabet.width)? as usize;
            return alphabet.by_index.get(index).copied().ok_or_else(|| {
                CodecError::wire(format!("character index {index} is outside the alphabet"))
            });
        }
        let code = buf.read_bits(7)? as u32;
        if self.kind == StringKind::Visible && !(0x20..=0x7E).contains(&code) {
            return Err(CodecError::wire(format!(
                "code point {code:#x} is not a visible character"
            )));
        }
        char::from_u32(code)
            .ok_or_else(|| CodecError::wire(format!("invalid code point {code:#x}")))
    }
}

/// OBJECT IDENTIFIER: the canonical arc octets (first two arcs
/// folded, base-128 continuation bytes) framed as a length-prefixed
/// octet string.
#[derive(Debug, Clone, Copy)]
pub struct ObjectIdentifierCodec;

impl ObjectIdentifierCodec {
    pub(crate) fn encode(&self, buf: &mut BitBuffer, value: &Value) -> Result<(), CodecError> {
        let arcs = value.as_oid()?;
        if arcs.len() < 2 {
            return Err(CodecError::constraint(
                "object identifier needs at least two arcs",
            ));
        }
        if arcs[0] > 2 {
            return Err(CodecError::constraint("first arc must be 0, 1 or 2"));
        }
        if arcs[0] < 2 && arcs[1] > 39 {
            return Err(CodecError::constraint(
                "second arc must be at most 39 when the first arc is 0 or 1",
            ));
        }
        let mut content = Vec::new();
        push_base128(&mut content, arcs[0] as u128 * 40 + arcs[1] as u128);
        for arc in &arcs[2..] {
            push_base128(&mut content, *arc as u128);
        }
        encode_length(buf, content.len(), |buf, range| {
            buf.write_octets(&content[range]);
            Ok(())
        })
    }

    pub(crate) fn decode(&self, buf: &mut BitBuffer) -> Result<Value, CodecError> {
        let mut content = Vec::new();
        decode_length(buf, |buf, count| {
            content.extend(buf.read_octets(count)?);
            Ok(())
        })?;
        if content.is_empty() {
            return Err(CodecError::wire("empty object identifier contents"));
        }
        let mut arcs = Vec::new();
        let mut cursor = 0;
        while cursor < content.len() {
            let (sub_identifier, next) = read_base128(&content, cursor)?;
            if arcs.is_empty() {
                let (first, second) = split_first_sub_identifier(sub_identifier)?;
                arcs.push(first);
                arcs.push(second);
            } else {
                arcs.push(
                    u64::try_from(sub_identifier)
                        .map_err(|_| CodecError::wire("object identifier arc overflows 64 bits"))?,
                );
            }
            cursor = next;
        }
        Ok(Value::Oid(arcs))
    }
}

fn push_base128(content: &mut Vec<u8>, value: u128) {
    let mut shift = 0;
    while value >> shift >= 0x80 {
        shift += 7;
    }
    while shift > 0 {
        content.push(0x80 | (value >> shift & 0x7F) as u8);
        shift -= 7;
    }
    content.push((value & 0x7F) as u8);
}

fn read_base128(content: &[u8], mut cursor: usize) -> Result<(u128, usize), CodecError> {
    if content[cursor] == 0x80 {
        return Err(CodecError::wire("non-minimal arc encoding"));
    }
    let mut value = 0u128;
    loop {
        let byte = content[cursor];
        cursor += 1;
        if value >> 113 != 0 {
            return Err(CodecError::wire("object identifier arc overflows"));
        }
        value = value << 7 | (byte & 0x7F) as u128;
        if byte & 0x80 == 0 {
            return Ok((value, cursor));
        }
        if cursor >= content.len() {
            return Err(CodecError::wire("truncated object identifier arc"));
        }
    }
}

fn split_first_sub_identifier(sub_identifier: u128) -> Result<(u64, u64), CodecError> {
    let (first, offset) = match sub_identifier {
        0..=39 => (0, 0),
        40..=79 => (1, 40),
        _ => (2, 80),
    };
    let second = u64::try_from(sub_identifier - offset)
        .map_err(|_| CodecError::wire("object identifier arc overflows 64 bits"))?;
    Ok((first, second))
}

//! Shared wire helpers: length determinants (short, long and
//! fragmented forms), size determinants, normally-small non-negative
//! integers and minimal big-endian integer bytes.

use std::ops::Range;

use crate::buffer::BitBuffer;
use crate::error::CodecError;

use super::SizeConstraints;

/// One step of reading a length determinant.
pub(crate) enum LengthDeterminant {
    /// Final count; no further fragments follow.
    Content(usize),
    /// A 16K fragment; the content continues with another determinant.
    ContentFragment(usize),
}

const FRAGMENT_UNIT: usize = 16384;

/// Number of bits needed for a constrained whole number with
/// `range` possible values.
pub(crate) fn bit_width(range: u128) -> usize {
    let mut width = 0;
    while width < 128 && range > 1u128 << width {
        width += 1;
    }
    width
}

/// Writes a non-fragmented length determinant; `count` must be below
/// 16384.
pub(crate) fn encode_length_determinant(
    buf: &mut BitBuffer,
    count: usize,
) -> Result<(), CodecError> {
    if count <= 127 {
        buf.write_bits(count as u128, 8)
    } else {
        buf.write_bits(0x8000 | count as u128, 16)
    }
}

pub(crate) fn decode_length_determinant(
    buf: &mut BitBuffer,
) -> Result<LengthDeterminant, CodecError> {
    let longer_than_127 = buf.read_bit()?;
    if longer_than_127 {
        let fragmented = buf.read_bit()?;
        if fragmented {
            let size_factor = buf.read_bits(6)? as usize;
            if size_factor == 0 || size_factor > 4 {
                return Err(CodecError::wire(format!(
                    "reserved length determinant fragment factor {size_factor}"
                )));
            }
            return Ok(LengthDeterminant::ContentFragment(
                FRAGMENT_UNIT * size_factor,
            ));
        }
        return Ok(LengthDeterminant::Content(buf.read_bits(14)? as usize));
    }
    Ok(LengthDeterminant::Content(buf.read_bits(7)? as usize))
}

/// Writes `count` items framed by a general length determinant,
/// fragmenting into 16K chunks where necessary. `chunk` is called with
/// the item range to emit after each determinant.
pub(crate) fn encode_length<F>(
    buf: &mut BitBuffer,
    count: usize,
    mut chunk: F,
) -> Result<(), CodecError>
where
    F: FnMut(&mut BitBuffer, Range<usize>) -> Result<(), CodecError>,
{
    let mut offset = 0;
    let mut left = count;
    while left >= FRAGMENT_UNIT {
        let factor = (left / FRAGMENT_UNIT).min(4);
        buf.write_bits(0xC0 | factor as u128, 8)?;
        let step = factor * FRAGMENT_UNIT;
        chunk(buf, offset..offset + step)?;
        offset += step;
        left -= step;
    }
    encode_length_determinant(buf, left)?;
    chunk(buf, offset..offset + left)
}

/// Reads items framed by a general length determinant, following
/// fragments until a final count arrives. `chunk` is called with the
/// number of items to consume after each determinant. Returns the
/// total item count.
pub(crate) fn decode_length<F>(buf: &mut BitBuffer, mut chunk: F) -> Result<usize, CodecError>
where
    F: FnMut(&mut BitBuffer, usize) -> Result<(), CodecError>,
{
    let mut total = 0;
    loop {
        match decode_length_determinant(buf)? {
            LengthDeterminant::Content(count) => {
                chunk(buf, count)?;
                return Ok(total + count);
            }
            LengthDeterminant::ContentFragment(count) => {
                chunk(buf, count)?;
                total += count;
            }
        }
    }
}

/// Normally-small non-negative integer: values up to 63 take one flag
/// bit and six value bits, anything larger is length-framed.
pub(crate) fn encode_normally_small(buf: &mut BitBuffer, value: usize) -> Result<(), CodecError> {
    if value <= 63 {
        buf.write_bit(false);
        buf.write_bits(value as u128, 6)
    } else {
        buf.write_bit(true);
        let bytes = to_unsigned_bytes_be(value as u128);
        encode_length(buf, bytes.len(), |buf, range| {
            buf.write_octets(&bytes[range]);
            Ok(())
        })
    }
}

pub(crate) fn decode_normally_small(buf: &mut BitBuffer) -> Result<usize, CodecError> {
    if !buf.read_bit()? {
        return Ok(buf.read_bits(6)? as usize);
    }
    let mut bytes = Vec::new();
    decode_length(buf, |buf, count| {
        bytes.extend(buf.read_octets(count)?);
        Ok(())
    })?;
    let value = from_unsigned_bytes_be(&bytes)?;
    usize::try_from(value)
        .map_err(|_| CodecError::wire(format!("normally-small integer {value} is out of range")))
}

/// Frames `count` items with a size determinant derived from the
/// container's size constraints, then emits them through `chunk`.
pub(crate) fn encode_size<F>(
    buf: &mut BitBuffer,
    size: &SizeConstraints,
    count: usize,
    mut chunk: F,
) -> Result<(), CodecError>
where
    F: FnMut(&mut BitBuffer, Range<usize>) -> Result<(), CodecError>,
{
    let in_root = size.contains(count);
    if size.extensible {
        buf.write_bit(!in_root);
        if !in_root {
            return encode_length(buf, count, chunk);
        }
    } else if !in_root {
        return Err(CodecError::constraint(format!(
            "size {count} violates the size constraint {size:?}"
        )));
    }
    if let Some(fixed) = size.fixed {
        debug_assert_eq!(count, fixed);
        return chunk(buf, 0..count);
    }
    let low = size.min.unwrap_or(0);
    match size.max {
        Some(high) if high - low < 65536 => {
            let width = bit_width((high - low + 1) as u128);
            buf.write_bits((count - low) as u128, width)?;
            chunk(buf, 0..count)
        }
        _ => encode_length(buf, count, chunk),
    }
}

/// Reads the size determinant matching `encode_size` and consumes the
/// items through `chunk`. Returns the item count.
pub(crate) fn decode_size<F>(
    buf: &mut BitBuffer,
    size: &SizeConstraints,
    mut chunk: F,
) -> Result<usize, CodecError>
where
    F: FnMut(&mut BitBuffer, usize) -> Result<(), CodecError>,
{
    if size.extensible && buf.read_bit()? {
        return decode_length(buf, chunk);
    }
    if let Some(fixed) = size.fixed {
        chunk(buf, fixed)?;
        return Ok(fixed);
    }
    let low = size.min.unwrap_or(0);
    match size.max {
        Some(high) if high - low < 65536 => {
            let width = bit_width((high - low + 1) as u128);
            let count = low + buf.read_bits(width)? as usize;
            if count > high {
                return Err(CodecError::wire(format!(
                    "size {count} exceeds the constrained maximum {high}"
                )));
            }
            chunk(buf, count)?;
            Ok(count)
        }
        _ => {
            let count = decode_length(buf, chunk)?;
            if count < low {
                return Err(CodecError::wire(format!(
                    "size {count} is below the constrained minimum {low}"
                )));
            }
            Ok(count)
        }
    }
}

/// Minimal unsigned big-endian representation, at least one byte.
pub(crate) fn to_unsigned_bytes_be(value: u128) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(15);
    bytes[first..].to_vec()
}

pub(crate) fn from_unsigned_bytes_be(bytes: &[u8]) -> Result<u128, CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::wire("empty integer contents"));
    }
    if bytes.len() > 16 {
        return Err(CodecError::wire(format!(
            "integer of {} bytes exceeds the supported range",
            bytes.len()
        )));
    }
    let mut value = 0u128;
    for byte in bytes {
        value = value << 8 | *byte as u128;
    }
    Ok(value)
}

/// Minimal two's-complement big-endian representation, at least one
/// byte.
pub(crate) fn to_signed_bytes_be(value: i128) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let mut first = 0;
    while first < 15 {
        let redundant = (bytes[first] == 0x00 && bytes[first + 1] < 0x80)
            || (bytes[first] == 0xFF && bytes[first + 1] >= 0x80);
        if !redundant {
            break;
        }
        first += 1;
    }
    bytes[first..].to_vec()
}

pub(crate) fn from_signed_bytes_be(bytes: &[u8]) -> Result<i128, CodecError> {
    if bytes.is_empty() {
        return Err(CodecError::wire("empty integer contents"));
    }
    if bytes.len() > 16 {
        return Err(CodecError::wire(format!(
            "integer of {} bytes exceeds the supported range",
            bytes.len()
        )));
    }
    let mut value = if bytes[0] >= 0x80 { -1i128 } else { 0 };
    for byte in bytes {
        value = value << 8 | *byte as i128;
    }
    Ok(value)
}

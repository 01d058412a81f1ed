//! Primitive wire encodings shared by every method body
//!
//! All multi-byte integers are big-endian and fixed width. Readers take a
//! `Bytes` cursor and check the remaining length before every read, so a
//! truncated buffer surfaces as [`Error::BufferTooSmall`] instead of a panic.
//! Writers treat oversized input as a caller defect and panic.

use bytes::{Buf, BufMut, Bytes};

use super::{Error, FieldTable, MAX_LONG_STRING_LEN, MAX_SHORT_STRING_LEN, Result};

/// Ensure at least `needed` bytes remain in the cursor.
#[inline]
pub(crate) fn ensure(buf: &Bytes, needed: usize) -> Result<()> {
    if buf.remaining() < needed {
        return Err(Error::BufferTooSmall {
            needed,
            got: buf.remaining(),
        });
    }
    Ok(())
}

/// Read an unsigned octet.
pub fn read_u8(buf: &mut Bytes) -> Result<u8> {
    ensure(buf, 1)?;
    Ok(buf.get_u8())
}

/// Read a big-endian unsigned 16-bit integer.
pub fn read_u16(buf: &mut Bytes) -> Result<u16> {
    ensure(buf, 2)?;
    Ok(buf.get_u16())
}

/// Read a big-endian unsigned 32-bit integer.
pub fn read_u32(buf: &mut Bytes) -> Result<u32> {
    ensure(buf, 4)?;
    Ok(buf.get_u32())
}

/// Read a big-endian unsigned 64-bit integer.
pub fn read_u64(buf: &mut Bytes) -> Result<u64> {
    ensure(buf, 8)?;
    Ok(buf.get_u64())
}

/// Split `len` bytes off the front of the cursor without copying.
pub(crate) fn read_slice(buf: &mut Bytes, len: usize) -> Result<Bytes> {
    ensure(buf, len)?;
    Ok(buf.split_to(len))
}

/// Read a short string.
///
/// A zero length prefix decodes to `None`, never to an empty string. The
/// bytes must be UTF-8; peers that send Latin-1 names (one byte per char)
/// get [`Error::InvalidUtf8`] rather than a lossy conversion.
pub fn read_short_string(buf: &mut Bytes) -> Result<Option<String>> {
    let len = usize::from(read_u8(buf)?);
    if len == 0 {
        return Ok(None);
    }
    let raw = read_slice(buf, len)?;
    Ok(Some(String::from_utf8(raw.to_vec())?))
}

/// Write a short string; `None` is written as a zero length prefix.
///
/// # Panics
///
/// Panics if the string is longer than 255 bytes.
pub fn write_short_string(buf: &mut impl BufMut, value: Option<&str>) {
    match value {
        Some(s) => {
            assert!(
                s.len() <= MAX_SHORT_STRING_LEN,
                "short string of {} bytes exceeds {MAX_SHORT_STRING_LEN}",
                s.len()
            );
            #[allow(clippy::cast_possible_truncation)]
            buf.put_u8(s.len() as u8);
            buf.put_slice(s.as_bytes());
        }
        None => buf.put_u8(0),
    }
}

/// Encoded size of a short string including its prefix.
#[must_use]
pub fn short_string_size(value: Option<&str>) -> usize {
    1 + value.map_or(0, str::len)
}

/// Read a long string.
///
/// Lengths above `0xFFFE` are rejected so that anything decoded here can be
/// written back by [`write_long_string`].
pub fn read_long_string(buf: &mut Bytes) -> Result<Bytes> {
    let len = read_u32(buf)? as usize;
    if len > MAX_LONG_STRING_LEN {
        return Err(Error::LongStringTooLong { len });
    }
    read_slice(buf, len)
}

/// Write a long string.
///
/// # Panics
///
/// Panics if the value is longer than `0xFFFE` bytes. Truncating would put a
/// corrupt frame on the wire.
pub fn write_long_string(buf: &mut impl BufMut, value: &[u8]) {
    assert!(
        value.len() <= MAX_LONG_STRING_LEN,
        "long string of {} bytes exceeds {MAX_LONG_STRING_LEN:#x}",
        value.len()
    );
    #[allow(clippy::cast_possible_truncation)]
    buf.put_u32(value.len() as u32);
    buf.put_slice(value);
}

/// Encoded size of a long string including its prefix.
#[must_use]
pub const fn long_string_size(value: &[u8]) -> usize {
    4 + value.len()
}

/// Read a content blob (4-byte length prefix, no size ceiling beyond `u32`).
pub fn read_content(buf: &mut Bytes) -> Result<Bytes> {
    let len = read_u32(buf)? as usize;
    read_slice(buf, len)
}

/// Write a content blob.
///
/// # Panics
///
/// Panics if the blob does not fit a 32-bit length prefix.
pub fn write_content(buf: &mut impl BufMut, value: &[u8]) {
    let len = u32::try_from(value.len()).expect("content blob exceeds u32::MAX bytes");
    buf.put_u32(len);
    buf.put_slice(value);
}

/// Read one octet of packed bit flags; bit `i` holds flag `i`.
pub fn read_booleans(buf: &mut Bytes) -> Result<[bool; 8]> {
    let packed = read_u8(buf)?;
    let mut flags = [false; 8];
    for (i, flag) in flags.iter_mut().enumerate() {
        *flag = packed & (1 << i) != 0;
    }
    Ok(flags)
}

/// Pack up to eight flags into one octet.
///
/// # Panics
///
/// Panics if more than eight flags are supplied.
pub fn write_booleans(buf: &mut impl BufMut, flags: &[bool]) {
    assert!(flags.len() <= 8, "cannot pack {} flags into one octet", flags.len());
    let packed = flags
        .iter()
        .enumerate()
        .filter(|(_, set)| **set)
        .fold(0u8, |acc, (i, _)| acc | (1 << i));
    buf.put_u8(packed);
}

/// Read a timestamp.
///
/// The high word is read and discarded: only 32 bits of precision survive a
/// round trip. Peers depend on this layout, so it is kept as is.
pub fn read_timestamp(buf: &mut Bytes) -> Result<u64> {
    ensure(buf, 8)?;
    let _high = buf.get_u32();
    Ok(u64::from(buf.get_u32()))
}

/// Write a timestamp; the high word is always zero.
pub fn write_timestamp(buf: &mut impl BufMut, timestamp: u64) {
    buf.put_u32(0);
    #[allow(clippy::cast_possible_truncation)]
    buf.put_u32(timestamp as u32);
}

/// Read an optional field table; a zero length prefix decodes to `None`.
pub fn read_field_table(buf: &mut Bytes) -> Result<Option<FieldTable>> {
    let len = read_u32(buf)? as usize;
    if len == 0 {
        return Ok(None);
    }
    let raw = read_slice(buf, len)?;
    FieldTable::decode_entries(raw).map(Some)
}

/// Write an optional field table; `None` is written as a zero length prefix.
pub fn write_field_table(buf: &mut impl BufMut, table: Option<&FieldTable>) {
    match table {
        Some(table) => table.encode(buf),
        None => buf.put_u32(0),
    }
}

/// Encoded size of an optional field table including its prefix.
#[must_use]
pub fn field_table_size(table: Option<&FieldTable>) -> usize {
    4 + table.map_or(0, FieldTable::encoded_entries_size)
}

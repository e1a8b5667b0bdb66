//! Helper functions for reading fixed-offset header fields

use byteorder::{ByteOrder, LittleEndian};

use crate::error::DecodeError;

/// Borrow `len` bytes at `offset`, or fail as a short header
fn field(data: &[u8], offset: usize, len: usize) -> Result<&[u8], DecodeError> {
    data.get(offset..offset + len).ok_or(DecodeError::TooShort {
        len: data.len(),
        min: offset + len,
    })
}

/// Read a single byte
pub(crate) fn read_u8(data: &[u8], offset: usize) -> Result<u8, DecodeError> {
    Ok(field(data, offset, 1)?[0])
}

/// Read a 16-bit little-endian integer
pub(crate) fn read_u16(data: &[u8], offset: usize) -> Result<u16, DecodeError> {
    Ok(LittleEndian::read_u16(field(data, offset, 2)?))
}

/// Read a 32-bit little-endian integer
pub(crate) fn read_u32(data: &[u8], offset: usize) -> Result<u32, DecodeError> {
    Ok(LittleEndian::read_u32(field(data, offset, 4)?))
}

/// Read a 32-bit little-endian float
pub(crate) fn read_f32(data: &[u8], offset: usize) -> Result<f32, DecodeError> {
    Ok(LittleEndian::read_f32(field(data, offset, 4)?))
}

/// Read a fixed-size byte array
pub(crate) fn read_bytes<const N: usize>(
    data: &[u8],
    offset: usize,
) -> Result<[u8; N], DecodeError> {
    let mut buf = [0u8; N];
    buf.copy_from_slice(field(data, offset, N)?);
    Ok(buf)
}

/// Read a length-prefixed name whose bytes start at `offset`
///
/// Names are not NUL-terminated; invalid UTF-8 is replaced rather than rejected.
pub(crate) fn read_name(
    data: &[u8],
    offset: usize,
    len: usize,
    name: &'static str,
) -> Result<String, DecodeError> {
    let bytes = data
        .get(offset..offset + len)
        .ok_or(DecodeError::NameOutOfBounds {
            field: name,
            offset,
            len,
        })?;
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

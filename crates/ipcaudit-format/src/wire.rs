//! Shared wire-level encoding helpers.
//!
//! All multi-byte integers are big-endian. Variable-length fields are
//! length-prefixed with a `u32`. Optional strings carry a one-byte
//! presence flag so that "absent" and "empty" survive a round trip as
//! distinct values.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Error raised while decoding a serialized audit log.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The input does not start with the expected format marker.
    #[error("bad format marker: {0:02x?}")]
    BadMagic([u8; 4]),

    /// The input ended before a complete value could be read.
    #[error("truncated input: needed {needed} more bytes")]
    Truncated { needed: usize },

    /// A record carried a variant tag this reader does not know.
    #[error("unknown record tag: {0}")]
    UnknownTag(u8),

    /// A record's declared length did not match its encoded contents.
    #[error("record length mismatch: declared {declared}, consumed {consumed}")]
    LengthMismatch { declared: usize, consumed: usize },

    /// A string field held invalid UTF-8.
    #[error("invalid UTF-8 in string field")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

const PRESENT: u8 = 1;
const ABSENT: u8 = 0;

pub(crate) fn put_opt_string(buf: &mut BytesMut, value: Option<&str>) {
    match value {
        Some(s) => {
            buf.put_u8(PRESENT);
            put_string(buf, s);
        }
        None => buf.put_u8(ABSENT),
    }
}

pub(crate) fn put_string(buf: &mut BytesMut, value: &str) {
    buf.put_u32(value.len() as u32);
    buf.put_slice(value.as_bytes());
}

pub(crate) fn put_blob(buf: &mut BytesMut, value: &[u8]) {
    buf.put_u32(value.len() as u32);
    buf.put_slice(value);
}

/// Check that `buf` has at least `needed` readable bytes.
pub(crate) fn ensure(buf: &Bytes, needed: usize) -> Result<(), DecodeError> {
    if buf.remaining() < needed {
        Err(DecodeError::Truncated {
            needed: needed - buf.remaining(),
        })
    } else {
        Ok(())
    }
}

pub(crate) fn get_u8(buf: &mut Bytes) -> Result<u8, DecodeError> {
    ensure(buf, 1)?;
    Ok(buf.get_u8())
}

pub(crate) fn get_u16(buf: &mut Bytes) -> Result<u16, DecodeError> {
    ensure(buf, 2)?;
    Ok(buf.get_u16())
}

pub(crate) fn get_u32(buf: &mut Bytes) -> Result<u32, DecodeError> {
    ensure(buf, 4)?;
    Ok(buf.get_u32())
}

pub(crate) fn get_i16(buf: &mut Bytes) -> Result<i16, DecodeError> {
    ensure(buf, 2)?;
    Ok(buf.get_i16())
}

pub(crate) fn get_i32(buf: &mut Bytes) -> Result<i32, DecodeError> {
    ensure(buf, 4)?;
    Ok(buf.get_i32())
}

pub(crate) fn get_opt_string(buf: &mut Bytes) -> Result<Option<String>, DecodeError> {
    match get_u8(buf)? {
        ABSENT => Ok(None),
        _ => Ok(Some(get_string(buf)?)),
    }
}

pub(crate) fn get_string(buf: &mut Bytes) -> Result<String, DecodeError> {
    let bytes = get_blob(buf)?;
    Ok(String::from_utf8(bytes)?)
}

pub(crate) fn get_blob(buf: &mut Bytes) -> Result<Vec<u8>, DecodeError> {
    let len = get_u32(buf)? as usize;
    ensure(buf, len)?;
    let mut out = vec![0u8; len];
    buf.copy_to_slice(&mut out);
    Ok(out)
}

//! An API for interacting with raw BSON bytes.
//!
//! This module provides two document types, [`RawDocumentBuf`] and [`&RawDocument`](RawDocument)
//! (an owned buffer and a reference respectively, akin to [`String`] and [`&str`](str)), and the
//! matching array types [`RawArrayBuf`] and [`&RawArray`](RawArray). Their storage is the encoded
//! BSON bytes themselves; nothing is parsed up front.
//!
//! Traversal is built on [`RawElement`], a cursor that knows the offset of one element in its
//! enclosing document, the length of its key, and the length of its value. Every offset a cursor
//! exposes has been bounds-checked against the enclosing buffer when the cursor was created, so
//! iterating over untrusted bytes never reads out of range. When a malformed element is
//! encountered, iteration simply ends; [`RawIter::error`] reports why, and
//! [`RawDocument::validate`] surfaces the problem as an explicit error.
//!
//! ```rust
//! use rawbson::raw::RawDocument;
//!
//! // See http://bsonspec.org/spec.html for details on the binary encoding of BSON.
//! let bytes = b"\x13\x00\x00\x00\x02hi\x00\x06\x00\x00\x00y'all\x00\x00";
//! let doc = RawDocument::from_bytes(bytes)?;
//! assert_eq!(doc.get_str("hi")?, "y'all");
//!
//! let element = doc.find("hi").unwrap();
//! assert_eq!(element.key(), "hi");
//! assert_eq!(element.value()?.as_str(), Some("y'all"));
//! # Ok::<(), rawbson::error::Error>(())
//! ```
//!
//! ### Iteration
//!
//! [`RawDocument`] implements [`IntoIterator`], which can also be accessed via
//! [`RawDocument::iter`]. Each call starts over at the first element.
//!
//! ```rust
//! use rawbson::{builder::DocumentStream, raw::ElementAccess};
//!
//! let doc = DocumentStream::new()
//!     .key("crate")
//!     .append("rawbson")
//!     .key("year")
//!     .append(2021)
//!     .extract()?;
//!
//! let keys: Vec<&str> = doc.iter().map(|e| e.key()).collect();
//! assert_eq!(keys, ["crate", "year"]);
//! assert_eq!(doc.find("year").unwrap().get_i32()?, 2021);
//! # Ok::<(), rawbson::error::Error>(())
//! ```

mod array;
mod array_buf;
mod bson_ref;
mod document;
mod document_buf;
mod elem;
mod iter;
#[cfg(test)]
mod test;
mod writer;

use std::convert::TryInto;

use crate::error::{BuilderErrorKind, Error, ErrorKind, Result};

pub use self::{
    array::{RawArray, RawArrayElement, RawArrayIter},
    array_buf::RawArrayBuf,
    bson_ref::{
        Decimal128,
        RawBinaryRef,
        RawBsonRef,
        RawDbPointerRef,
        RawJavaScriptCodeWithScopeRef,
        RawRegexRef,
        Timestamp,
    },
    document::RawDocument,
    document_buf::RawDocumentBuf,
    elem::{ElementAccess, RawElement},
    iter::RawIter,
};

pub(crate) use self::writer::RawWriter;

pub(crate) const MIN_BSON_STRING_SIZE: i32 = 4 + 1; // 4 bytes for length, one byte for null terminator
pub(crate) const MIN_BSON_DOCUMENT_SIZE: i32 = 4 + 1; // 4 bytes for length, one byte for null terminator
pub(crate) const MIN_CODE_WITH_SCOPE_SIZE: i32 = 4 + MIN_BSON_STRING_SIZE + MIN_BSON_DOCUMENT_SIZE;

/// The largest number of bytes a single BSON document may occupy.
pub const MAX_BSON_SIZE: i32 = i32::MAX;

/// Given a u8 slice, return an f64 calculated from the first eight bytes in
/// little endian order.
fn f64_from_slice(val: &[u8]) -> Result<f64> {
    let arr = val
        .get(0..8)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| {
            Error::malformed_bytes(format!(
                "expected 8 bytes to read double, instead got {}",
                val.len()
            ))
        })?;
    Ok(f64::from_le_bytes(arr))
}

/// Given a u8 slice, return an i32 calculated from the first four bytes in
/// little endian order.
pub(crate) fn i32_from_slice(val: &[u8]) -> Result<i32> {
    let arr: [u8; 4] = val
        .get(0..4)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| {
            Error::malformed_bytes(format!(
                "expected 4 bytes to read i32, instead got {}",
                val.len()
            ))
        })?;
    Ok(i32::from_le_bytes(arr))
}

/// Given an u8 slice, return an i64 calculated from the first 8 bytes in
/// little endian order.
fn i64_from_slice(val: &[u8]) -> Result<i64> {
    let arr = val
        .get(0..8)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| {
            Error::malformed_bytes(format!(
                "expected 8 bytes to read i64, instead got {}",
                val.len()
            ))
        })?;
    Ok(i64::from_le_bytes(arr))
}

fn u8_from_slice(val: &[u8]) -> Result<u8> {
    val.first().copied().ok_or_else(|| {
        Error::malformed_bytes(format!(
            "expected 1 byte to read u8, instead got {}",
            val.len()
        ))
    })
}

fn bool_from_slice(val: &[u8]) -> Result<bool> {
    let val = u8_from_slice(val)?;
    if val > 1 {
        return Err(Error::malformed_bytes(format!(
            "boolean must be stored as 0 or 1, got {}",
            val
        )));
    }

    Ok(val != 0)
}

/// Reads the length prefix of a length-encoded, null-terminated string at the start of `buf` and
/// returns the total number of bytes it occupies, including the prefix.
fn read_len(buf: &[u8]) -> Result<usize> {
    if buf.len() < 4 {
        return Err(Error::malformed_bytes(format!(
            "expected buffer with string to contain at least 4 bytes, but it only has {}",
            buf.len()
        )));
    }

    let length = i32_from_slice(&buf[..4])?;
    let end = checked_add(usize_try_from_i32(length)?, 4)?;

    if end < MIN_BSON_STRING_SIZE as usize {
        return Err(Error::malformed_bytes(format!(
            "BSON length encoded string needs to be at least {} bytes, instead got {}",
            MIN_BSON_STRING_SIZE, end
        )));
    }

    if buf.len() < end {
        return Err(Error::malformed_bytes(format!(
            "expected buffer to contain at least {} bytes, but it only has {}",
            end,
            buf.len()
        )));
    }

    if buf[end - 1] != 0 {
        return Err(Error::malformed_bytes(
            "expected string to be null-terminated",
        ));
    }

    Ok(end)
}

fn read_lenencode_bytes(buf: &[u8]) -> Result<&[u8]> {
    let end = read_len(buf)?;

    // exclude length-prefix and null byte suffix
    Ok(&buf[4..(end - 1)])
}

fn read_lenencode(buf: &[u8]) -> Result<&str> {
    try_to_str(read_lenencode_bytes(buf)?)
}

/// Returns the number of bytes before the first null byte in `buf`.
fn cstring_len(buf: &[u8]) -> Result<usize> {
    buf.iter()
        .position(|b| *b == 0)
        .ok_or_else(|| Error::malformed_bytes("expected null terminator"))
}

fn read_nullterminated(buf: &[u8]) -> Result<&str> {
    let len = cstring_len(buf)?;
    try_to_str(&buf[..len])
}

fn try_to_str(data: &[u8]) -> Result<&str> {
    simdutf8::basic::from_utf8(data).map_err(|_| ErrorKind::Utf8Encoding.into())
}

fn usize_try_from_i32(i: i32) -> Result<usize> {
    usize::try_from(i).map_err(Error::malformed_bytes)
}

fn checked_add(lhs: usize, rhs: usize) -> Result<usize> {
    lhs.checked_add(rhs)
        .ok_or_else(|| Error::malformed_bytes("attempted to add with overflow"))
}

/// Checks the outer framing of a document: at least five bytes, a length prefix equal to the
/// buffer length, and a trailing null byte.
pub(crate) fn check_framing(data: &[u8]) -> Result<()> {
    if data.len() < MIN_BSON_DOCUMENT_SIZE as usize {
        return Err(Error::malformed_bytes("document too short"));
    }

    let length = i32_from_slice(data)?;

    if usize::try_from(length).ok() != Some(data.len()) {
        return Err(Error::malformed_bytes(format!(
            "document length incorrect: prefix says {} but buffer has {} bytes",
            length,
            data.len()
        )));
    }

    if data[data.len() - 1] != 0 {
        return Err(Error::malformed_bytes("document not null-terminated"));
    }

    Ok(())
}

pub(crate) fn write_string(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    buf.extend(string_len_prefix(s.len())?.to_le_bytes());
    buf.extend(s.as_bytes());
    buf.push(0);
    Ok(())
}

/// The length prefix of a string of `len` bytes, which counts the null terminator.
fn string_len_prefix(len: usize) -> Result<i32> {
    i32::try_from(len)
        .ok()
        .and_then(|len| len.checked_add(1))
        .ok_or_else(|| Error::builder(BuilderErrorKind::ValueTooLarge))
}

pub(crate) fn write_cstring(buf: &mut Vec<u8>, s: &str) -> Result<()> {
    check_cstring(s)?;
    buf.extend(s.as_bytes());
    buf.push(0);
    Ok(())
}

pub(crate) fn check_cstring(s: &str) -> Result<()> {
    if s.contains('\0') {
        return Err(Error::malformed_bytes(format!(
            "cstring with interior null: {:?}",
            s
        )));
    }
    Ok(())
}

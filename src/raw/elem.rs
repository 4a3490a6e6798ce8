use std::borrow::Cow;

use super::{
    bool_from_slice,
    checked_add,
    cstring_len,
    f64_from_slice,
    i32_from_slice,
    i64_from_slice,
    read_lenencode,
    read_nullterminated,
    try_to_str,
    usize_try_from_i32,
    Decimal128,
    RawArray,
    RawBinaryRef,
    RawBsonRef,
    RawDbPointerRef,
    RawDocument,
    RawJavaScriptCodeWithScopeRef,
    RawRegexRef,
    Timestamp,
    MIN_BSON_DOCUMENT_SIZE,
    MIN_BSON_STRING_SIZE,
    MIN_CODE_WITH_SCOPE_SIZE,
};
use crate::{
    error::{Error, Result},
    oid::ObjectId,
    spec::{BinarySubtype, ElementType},
};

/// A cursor over a single element of a BSON document.
///
/// The cursor borrows the whole enclosing document and records where the element starts, how
/// long its key is, and how long its value is. All of these are checked against the bounds of the
/// enclosing document when the cursor is created; none of the accessors can read out of range.
///
/// Two cursors are equal when they point at the same offset of the same buffer. Comparing the
/// values they reference is done through [`RawElement::value`].
#[derive(Clone, Copy)]
pub struct RawElement<'a> {
    data: &'a [u8],
    offset: usize,
    key_len: usize,
    value_len: usize,
    element_type: ElementType,
}

impl<'a> RawElement<'a> {
    /// Reads the element whose type tag is at `offset` in `data`, which must be the bytes of an
    /// entire document.
    ///
    /// Returns `Ok(None)` if `offset` is the document's terminating null byte, and an error if the
    /// element cannot be read without going past the end of the document.
    pub(crate) fn read_at(data: &'a [u8], offset: usize) -> Result<Option<Self>> {
        let terminator = match data.len().checked_sub(1) {
            Some(t) => t,
            None => return Err(Error::malformed_bytes("document too short")),
        };

        if offset == terminator {
            return if data[offset] == 0 {
                Ok(None)
            } else {
                Err(Error::malformed_bytes("document not null terminated"))
            };
        } else if offset > terminator {
            return Err(Error::malformed_bytes("iteration overflowed document"));
        }

        let tag = data[offset];
        let key_start = offset + 1;
        let key_len = cstring_len(&data[key_start..terminator])?;
        let key = try_to_str(&data[key_start..(key_start + key_len)])?;

        let element_type = ElementType::from(tag).ok_or_else(|| {
            Error::malformed_bytes(format!("invalid tag: {}", tag)).with_key(key)
        })?;

        let value_offset = key_start + key_len + 1;
        let value_len = value_length(element_type, &data[value_offset..terminator])
            .map_err(|e| e.with_key(key))?;

        Ok(Some(Self {
            data,
            offset,
            key_len,
            value_len,
            element_type,
        }))
    }

    /// The type of this element's value.
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// This element's key.
    pub fn key(&self) -> &'a str {
        let bytes = self.key_bytes();
        // The key was validated as UTF-8 when this cursor was created.
        try_to_str(bytes).unwrap_or_default()
    }

    /// This element's key, without the null terminator.
    pub fn key_bytes(&self) -> &'a [u8] {
        &self.data[(self.offset + 1)..(self.offset + 1 + self.key_len)]
    }

    /// The offset of this element's type tag in the enclosing document.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The offset of this element's value in the enclosing document.
    pub fn value_offset(&self) -> usize {
        self.offset + 1 + self.key_len + 1
    }

    /// The number of bytes occupied by this element's value.
    pub fn value_len(&self) -> usize {
        self.value_len
    }

    /// The encoded bytes of this element's value.
    pub fn value_bytes(&self) -> &'a [u8] {
        let start = self.value_offset();
        &self.data[start..(start + self.value_len)]
    }

    /// The offset of the sibling element that follows this one.
    pub fn next_offset(&self) -> usize {
        self.value_offset() + self.value_len
    }

    /// The sibling element that follows this one, or `None` if this is the last element.
    pub fn next(&self) -> Result<Option<RawElement<'a>>> {
        Self::read_at(self.data, self.next_offset())
    }

    /// Decodes this element's value.
    pub fn value(&self) -> Result<RawBsonRef<'a>> {
        decode_value(self.element_type, self.value_bytes()).map_err(|e| e.with_key(self.key()))
    }
}

impl PartialEq for RawElement<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.data.as_ptr(), other.data.as_ptr()) && self.offset == other.offset
    }
}

impl Eq for RawElement<'_> {}

impl std::fmt::Debug for RawElement<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawElement")
            .field("key", &self.key())
            .field("element_type", &self.element_type)
            .field("offset", &self.offset)
            .field("value", &hex::encode(self.value_bytes()))
            .finish()
    }
}

/// Computes the length of a value of the given type from the bytes that follow its key, without
/// reading past the end of `remaining`.
fn value_length(element_type: ElementType, remaining: &[u8]) -> Result<usize> {
    let len = match element_type {
        ElementType::String | ElementType::JavaScriptCode | ElementType::Symbol => {
            length_prefix(remaining, MIN_BSON_STRING_SIZE, 4)?
        }
        ElementType::EmbeddedDocument | ElementType::Array => {
            length_prefix(remaining, MIN_BSON_DOCUMENT_SIZE, 0)?
        }
        ElementType::JavaScriptCodeWithScope => {
            length_prefix(remaining, MIN_CODE_WITH_SCOPE_SIZE, 0)?
        }
        ElementType::Binary => {
            // length prefix, subtype byte, then the payload
            checked_add(length_prefix(remaining, 0, 4)?, 1)?
        }
        ElementType::RegularExpression => {
            let pattern = cstring_len(remaining)? + 1;
            let options = cstring_len(remaining.get(pattern..).unwrap_or_default())? + 1;
            pattern + options
        }
        ElementType::DbPointer => {
            checked_add(length_prefix(remaining, MIN_BSON_STRING_SIZE, 4)?, 12)?
        }
        other => other.fixed_width().unwrap_or_default(),
    };

    if len > remaining.len() {
        return Err(Error::malformed_bytes(format!(
            "length exceeds remaining length of buffer: {} vs {}",
            len,
            remaining.len()
        )));
    }

    Ok(len)
}

/// Reads an `int32` length prefix and returns `prefix + extra`, checking that the prefix is at
/// least `min`.
fn length_prefix(remaining: &[u8], min: i32, extra: usize) -> Result<usize> {
    let length = i32_from_slice(remaining)?;
    if length < min {
        return Err(Error::malformed_bytes(format!(
            "length prefix too small: {} < {}",
            length, min
        )));
    }
    checked_add(usize_try_from_i32(length)?, extra)
}

fn read_document(bytes: &[u8]) -> Result<&RawDocument> {
    RawDocument::from_bytes(bytes)
}

pub(crate) fn decode_value(element_type: ElementType, bytes: &[u8]) -> Result<RawBsonRef<'_>> {
    Ok(match element_type {
        ElementType::Double => RawBsonRef::Double(f64_from_slice(bytes)?),
        ElementType::String => RawBsonRef::String(read_lenencode(bytes)?),
        ElementType::EmbeddedDocument => RawBsonRef::Document(read_document(bytes)?),
        ElementType::Array => RawBsonRef::Array(RawArray::from_doc(read_document(bytes)?)),
        ElementType::Binary => {
            let len = usize_try_from_i32(i32_from_slice(bytes)?)?;
            let subtype = BinarySubtype::from(bytes[4]);
            let data = &bytes[5..];
            if data.len() != len {
                return Err(Error::malformed_bytes(format!(
                    "binary length mismatch: {} declared, {} available",
                    len,
                    data.len()
                )));
            }
            let data = match subtype {
                BinarySubtype::BinaryOld => {
                    if len < 4 {
                        return Err(Error::malformed_bytes(
                            "old binary subtype has no inner declared length",
                        ));
                    }
                    let oldlength = usize_try_from_i32(i32_from_slice(data)?)?;
                    if checked_add(oldlength, 4)? != len {
                        return Err(Error::malformed_bytes(
                            "old binary subtype has wrong inner declared length",
                        ));
                    }
                    &data[4..]
                }
                _ => data,
            };
            RawBsonRef::Binary(RawBinaryRef {
                subtype,
                bytes: data,
            })
        }
        ElementType::Undefined => RawBsonRef::Undefined,
        ElementType::ObjectId => {
            let id: [u8; 12] = bytes
                .try_into()
                .map_err(|_| Error::malformed_bytes("ObjectId must be 12 bytes"))?;
            RawBsonRef::ObjectId(ObjectId::from_bytes(id))
        }
        ElementType::Boolean => RawBsonRef::Boolean(bool_from_slice(bytes)?),
        ElementType::DateTime => RawBsonRef::DateTime(i64_from_slice(bytes)?),
        ElementType::Null => RawBsonRef::Null,
        ElementType::RegularExpression => {
            let pattern = read_nullterminated(bytes)?;
            let options = read_nullterminated(&bytes[(pattern.len() + 1)..])?;
            RawBsonRef::RegularExpression(RawRegexRef { pattern, options })
        }
        ElementType::DbPointer => {
            let namespace = read_lenencode(bytes)?;
            let start = 4 + namespace.len() + 1;
            let id: [u8; 12] = bytes[start..]
                .try_into()
                .map_err(|_| Error::malformed_bytes("DbPointer id must be 12 bytes"))?;
            RawBsonRef::DbPointer(RawDbPointerRef {
                namespace,
                id: ObjectId::from_bytes(id),
            })
        }
        ElementType::JavaScriptCode => RawBsonRef::JavaScriptCode(read_lenencode(bytes)?),
        ElementType::Symbol => RawBsonRef::Symbol(read_lenencode(bytes)?),
        ElementType::JavaScriptCodeWithScope => {
            let code = read_lenencode(&bytes[4..])?;
            let scope_start = 4 + 4 + code.len() + 1;
            let scope = read_document(bytes.get(scope_start..).unwrap_or_default())?;
            RawBsonRef::JavaScriptCodeWithScope(RawJavaScriptCodeWithScopeRef { code, scope })
        }
        ElementType::Int32 => RawBsonRef::Int32(i32_from_slice(bytes)?),
        ElementType::Timestamp => RawBsonRef::Timestamp(Timestamp::from_le_bytes(
            bytes
                .try_into()
                .map_err(|_| Error::malformed_bytes("timestamp must be 8 bytes"))?,
        )),
        ElementType::Int64 => RawBsonRef::Int64(i64_from_slice(bytes)?),
        ElementType::Decimal128 => RawBsonRef::Decimal128(Decimal128::from_bytes(
            bytes
                .try_into()
                .map_err(|_| Error::malformed_bytes("decimal128 must be 16 bytes"))?,
        )),
        ElementType::MinKey => RawBsonRef::MinKey,
        ElementType::MaxKey => RawBsonRef::MaxKey,
    })
}

/// Operations shared by document elements and array elements.
///
/// The typed getters decode the element's value and return an
/// [`UnexpectedType`](crate::error::ValueAccessErrorKind::UnexpectedType) error if it holds a
/// different type.
pub trait ElementAccess<'a> {
    /// The underlying cursor.
    fn raw(&self) -> RawElement<'a>;

    /// The element's key. For array elements this is the decimal string of the index.
    fn key_string(&self) -> Cow<'a, str>;

    #[doc(hidden)]
    fn annotate(&self, error: Error) -> Error;

    /// The type of the element's value.
    fn element_type(&self) -> ElementType {
        self.raw().element_type()
    }

    /// Decodes the element's value.
    fn value(&self) -> Result<RawBsonRef<'a>> {
        let raw = self.raw();
        decode_value(raw.element_type(), raw.value_bytes()).map_err(|e| self.annotate(e))
    }

    /// The encoded bytes of the element's value.
    fn value_bytes(&self) -> &'a [u8] {
        self.raw().value_bytes()
    }

    fn get_f64(&self) -> Result<f64> {
        extract(self, ElementType::Double, RawBsonRef::as_f64)
    }

    fn get_str(&self) -> Result<&'a str> {
        extract(self, ElementType::String, RawBsonRef::as_str)
    }

    fn get_document(&self) -> Result<&'a RawDocument> {
        extract(self, ElementType::EmbeddedDocument, RawBsonRef::as_document)
    }

    fn get_array(&self) -> Result<&'a RawArray> {
        extract(self, ElementType::Array, RawBsonRef::as_array)
    }

    fn get_binary(&self) -> Result<RawBinaryRef<'a>> {
        extract(self, ElementType::Binary, RawBsonRef::as_binary)
    }

    fn get_object_id(&self) -> Result<ObjectId> {
        extract(self, ElementType::ObjectId, RawBsonRef::as_object_id)
    }

    fn get_bool(&self) -> Result<bool> {
        extract(self, ElementType::Boolean, RawBsonRef::as_bool)
    }

    /// Milliseconds since the Unix epoch.
    fn get_datetime(&self) -> Result<i64> {
        extract(self, ElementType::DateTime, RawBsonRef::as_datetime)
    }

    fn get_regex(&self) -> Result<RawRegexRef<'a>> {
        extract(self, ElementType::RegularExpression, RawBsonRef::as_regex)
    }

    fn get_i32(&self) -> Result<i32> {
        extract(self, ElementType::Int32, RawBsonRef::as_i32)
    }

    fn get_timestamp(&self) -> Result<Timestamp> {
        extract(self, ElementType::Timestamp, RawBsonRef::as_timestamp)
    }

    fn get_i64(&self) -> Result<i64> {
        extract(self, ElementType::Int64, RawBsonRef::as_i64)
    }
}

fn extract<'a, T, E: ElementAccess<'a> + ?Sized>(
    element: &E,
    expected: ElementType,
    f: impl FnOnce(RawBsonRef<'a>) -> Option<T>,
) -> Result<T> {
    let value = element
        .value()
        .map_err(|e| element.annotate(Error::value_access_invalid_bson(e.kind.to_string())))?;
    match f(value) {
        Some(t) => Ok(t),
        None => Err(element.annotate(Error::value_access_unexpected_type(
            value.element_type(),
            expected,
        ))),
    }
}

impl<'a> ElementAccess<'a> for RawElement<'a> {
    fn raw(&self) -> RawElement<'a> {
        *self
    }

    fn key_string(&self) -> Cow<'a, str> {
        Cow::Borrowed(self.key())
    }

    fn annotate(&self, error: Error) -> Error {
        error.with_key(self.key())
    }
}

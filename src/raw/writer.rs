use std::ops::Range;

use super::{
    check_framing,
    write_cstring,
    write_string,
    RawBsonRef,
    RawElement,
    MAX_BSON_SIZE,
    MIN_BSON_DOCUMENT_SIZE,
};
use crate::{
    error::{BuilderErrorKind, Error, Result},
    spec::{BinarySubtype, ElementType},
};

/// Appends elements to the end of an open, unterminated document frame.
///
/// Every write either succeeds completely or leaves the buffer exactly as it found it. Closing the
/// frame (terminator and length prefix) is up to the caller.
pub(crate) struct RawWriter<'a> {
    data: &'a mut Vec<u8>,

    /// Terminator bytes still owed by the frames enclosing the write position.
    reserve: usize,
}

impl<'a> RawWriter<'a> {
    pub(crate) fn new(data: &'a mut Vec<u8>) -> Self {
        Self::with_reserve(data, 1)
    }

    pub(crate) fn with_reserve(data: &'a mut Vec<u8>, reserve: usize) -> Self {
        Self { data, reserve }
    }

    pub(crate) fn append(&mut self, key: &str, value: RawBsonRef) -> Result<()> {
        self.guarded(0, |data| write_element(data, key, value))
    }

    /// Writes the type tag and key of a document or array element followed by a placeholder
    /// length, and returns the offset of the nested frame. The caller patches the length once the
    /// frame is terminated.
    pub(crate) fn open_frame(&mut self, element_type: ElementType, key: &str) -> Result<usize> {
        self.guarded(1, |data| {
            data.push(element_type as u8);
            write_cstring(data, key)?;
            let start = data.len();
            data.extend(MIN_BSON_DOCUMENT_SIZE.to_le_bytes());
            Ok(start)
        })
    }

    /// Copies `element` under a new key, keeping its type tag and value bytes.
    pub(crate) fn append_element(&mut self, key: &str, element: RawElement<'_>) -> Result<()> {
        self.guarded(0, |data| {
            data.push(element.element_type() as u8);
            write_cstring(data, key)?;
            data.extend_from_slice(element.value_bytes());
            Ok(())
        })
    }

    /// Copies the elements of an encoded document body verbatim.
    pub(crate) fn append_raw_elements(&mut self, elements: &[u8]) -> Result<()> {
        self.guarded(0, |data| {
            data.extend_from_slice(elements);
            Ok(())
        })
    }

    /// Writes a binary element with a zero-filled payload of `len` bytes and returns the range of
    /// the payload in the buffer, for the caller to fill in place.
    pub(crate) fn append_binary_uninit(
        &mut self,
        key: &str,
        subtype: BinarySubtype,
        len: usize,
    ) -> Result<Range<usize>> {
        self.guarded(0, |data| {
            let too_large = || Error::builder(BuilderErrorKind::ValueTooLarge);
            let old = subtype == BinarySubtype::BinaryOld;
            let declared = i32::try_from(len)
                .ok()
                .and_then(|len| if old { len.checked_add(4) } else { Some(len) })
                .ok_or_else(too_large)?;
            data.push(ElementType::Binary as u8);
            write_cstring(data, key)?;
            data.extend(declared.to_le_bytes());
            data.push(subtype.into());
            if old {
                data.extend((declared - 4).to_le_bytes());
            }
            let start = data.len();
            data.resize(start + len, 0);
            Ok(start..(start + len))
        })
    }

    /// Runs `f`, rolling the buffer back if it fails or grows the buffer past the size a
    /// document's length prefix can describe. `opened` is the number of frames `f` leaves open.
    fn guarded<T>(
        &mut self,
        opened: usize,
        f: impl FnOnce(&mut Vec<u8>) -> Result<T>,
    ) -> Result<T> {
        let original_len = self.data.len();
        let reserve = self.reserve + opened;
        let result = f(self.data).and_then(|t| {
            // leave room for the terminators
            if self.data.len() + reserve > MAX_BSON_SIZE as usize {
                Err(Error::builder(BuilderErrorKind::ValueTooLarge))
            } else {
                Ok(t)
            }
        });
        if result.is_err() {
            self.data.truncate(original_len);
        }
        result
    }
}

fn write_element(data: &mut Vec<u8>, key: &str, value: RawBsonRef) -> Result<()> {
    data.push(value.element_type() as u8);
    write_cstring(data, key)?;

    match value {
        RawBsonRef::Int32(i) => {
            data.extend(i.to_le_bytes());
        }
        RawBsonRef::String(s) => {
            write_string(data, s)?;
        }
        RawBsonRef::Document(d) => {
            check_framing(d.as_bytes())?;
            data.extend(d.as_bytes());
        }
        RawBsonRef::Array(a) => {
            check_framing(a.as_bytes())?;
            data.extend(a.as_bytes());
        }
        RawBsonRef::Binary(b) => {
            let len = i32::try_from(b.len())
                .map_err(|_| Error::builder(BuilderErrorKind::ValueTooLarge))?;
            data.extend(len.to_le_bytes());
            data.push(b.subtype.into());
            if let BinarySubtype::BinaryOld = b.subtype {
                data.extend((len - 4).to_le_bytes())
            }
            data.extend(b.bytes);
        }
        RawBsonRef::Boolean(b) => {
            data.push(b as u8);
        }
        RawBsonRef::DateTime(millis) => {
            data.extend(millis.to_le_bytes());
        }
        RawBsonRef::DbPointer(dbp) => {
            write_string(data, dbp.namespace)?;
            data.extend(dbp.id.bytes());
        }
        RawBsonRef::Decimal128(d) => {
            data.extend(d.bytes());
        }
        RawBsonRef::Double(d) => {
            data.extend(d.to_le_bytes());
        }
        RawBsonRef::Int64(i) => {
            data.extend(i.to_le_bytes());
        }
        RawBsonRef::RegularExpression(re) => {
            write_cstring(data, re.pattern)?;
            write_cstring(data, re.options)?;
        }
        RawBsonRef::JavaScriptCode(js) => {
            write_string(data, js)?;
        }
        RawBsonRef::JavaScriptCodeWithScope(code_w_scope) => {
            check_framing(code_w_scope.scope.as_bytes())?;
            let len = i32::try_from(code_w_scope.len())
                .map_err(|_| Error::builder(BuilderErrorKind::ValueTooLarge))?;
            data.extend(len.to_le_bytes());
            write_string(data, code_w_scope.code)?;
            data.extend(code_w_scope.scope.as_bytes());
        }
        RawBsonRef::Timestamp(ts) => {
            data.extend(ts.to_le_bytes());
        }
        RawBsonRef::ObjectId(oid) => {
            data.extend(oid.bytes());
        }
        RawBsonRef::Symbol(s) => {
            write_string(data, s)?;
        }
        RawBsonRef::Null | RawBsonRef::Undefined | RawBsonRef::MinKey | RawBsonRef::MaxKey => {}
    }

    Ok(())
}

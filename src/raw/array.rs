use std::{borrow::Cow, iter::FusedIterator};

use super::{
    elem::ElementAccess,
    RawArrayBuf,
    RawBinaryRef,
    RawBsonRef,
    RawDocument,
    RawElement,
    RawIter,
    RawRegexRef,
    Timestamp,
};
use crate::{
    error::{Error, Result},
    oid::ObjectId,
    spec::ElementType,
};

/// A slice of a BSON document containing a BSON array value (akin to [`std::str`]). This can be
/// retrieved from a [`RawDocument`] via [`RawDocument::get`].
///
/// This is an _unsized_ type, meaning that it must always be used behind a pointer like `&`.
///
/// Accessing elements within a [`RawArray`] is similar to element access in [`RawDocument`],
/// but elements are addressed by position. The keys stored in the bytes are not checked against
/// the positions they occur at.
///
/// ```
/// use rawbson::builder::ArrayStream;
///
/// let array = ArrayStream::new()
///     .append(1)
///     .append("two")
///     .append(3.0)
///     .extract()?;
///
/// assert_eq!(array.get_i32(0)?, 1);
/// assert_eq!(array.get_str(1)?, "two");
/// assert!(array.get(3)?.is_none());
///
/// let keys: Vec<String> = array.iter().map(|e| e.key().into_owned()).collect();
/// assert_eq!(keys, ["0", "1", "2"]);
/// # Ok::<(), rawbson::error::Error>(())
/// ```
#[derive(PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct RawArray {
    pub(crate) doc: RawDocument,
}

impl RawArray {
    pub(crate) fn from_doc(doc: &RawDocument) -> &RawArray {
        // SAFETY:
        //
        // Dereferencing a raw pointer requires unsafe due to the potential that the pointer is
        // null, dangling, or misaligned. We know the pointer is not null or dangling due to the
        // fact that it's created by a safe reference. Converting &RawDocument to *const
        // RawDocument will be properly aligned due to them being references to the same type,
        // and converting *const RawDocument to *const RawArray is aligned due to the fact that
        // the only field in a RawArray is a RawDocument, meaning the structs are represented
        // identically at the byte level.
        unsafe { &*(doc as *const RawDocument as *const RawArray) }
    }

    /// Checks the outer framing of `data` like [`RawDocument::from_bytes`] and views it as an
    /// array.
    pub fn from_bytes<D: AsRef<[u8]> + ?Sized>(data: &D) -> Result<&RawArray> {
        RawDocument::from_bytes(data).map(RawArray::from_doc)
    }

    /// Creates a new [`RawArrayBuf`] with an owned copy of the BSON bytes.
    pub fn to_raw_array_buf(&self) -> RawArrayBuf {
        RawArrayBuf::from_raw_document_buf(self.doc.to_raw_document_buf())
    }

    /// Gets an iterator over the elements of this array, starting at index 0.
    pub fn iter(&self) -> RawArrayIter<'_> {
        RawArrayIter {
            inner: self.doc.iter(),
            index: 0,
        }
    }

    /// Finds the element at the given position.
    pub fn find(&self, index: usize) -> Option<RawArrayElement<'_>> {
        self.iter().nth(index)
    }

    /// Gets a reference to the value at the given index.
    pub fn get(&self, index: usize) -> Result<Option<RawBsonRef<'_>>> {
        let mut iter = self.iter();
        if let Some(element) = iter.nth(index) {
            return element.value().map(Some);
        }
        match iter.inner.take_error() {
            Some(e) => Err(e.with_index(index)),
            None => Ok(None),
        }
    }

    fn get_with<'a, T>(
        &'a self,
        index: usize,
        expected_type: ElementType,
        f: impl FnOnce(RawBsonRef<'a>) -> Option<T>,
    ) -> Result<T> {
        let bson = self
            .get(index)
            .map_err(|e| Error::value_access_invalid_bson(e.to_string()).with_index(index))?
            .ok_or_else(|| Error::value_access_not_present().with_index(index))?;
        match f(bson) {
            Some(t) => Ok(t),
            None => Err(
                Error::value_access_unexpected_type(bson.element_type(), expected_type)
                    .with_index(index),
            ),
        }
    }

    /// Gets the BSON double at the given index or returns an error if the value at that index
    /// isn't a double.
    pub fn get_f64(&self, index: usize) -> Result<f64> {
        self.get_with(index, ElementType::Double, RawBsonRef::as_f64)
    }

    /// Gets a reference to the string at the given index or returns an error if the
    /// value at that index isn't a string.
    pub fn get_str(&self, index: usize) -> Result<&str> {
        self.get_with(index, ElementType::String, RawBsonRef::as_str)
    }

    /// Gets a reference to the document at the given index or returns an error if the
    /// value at that index isn't a document.
    pub fn get_document(&self, index: usize) -> Result<&RawDocument> {
        self.get_with(index, ElementType::EmbeddedDocument, RawBsonRef::as_document)
    }

    /// Gets a reference to the array at the given index or returns an error if the
    /// value at that index isn't an array.
    pub fn get_array(&self, index: usize) -> Result<&RawArray> {
        self.get_with(index, ElementType::Array, RawBsonRef::as_array)
    }

    /// Gets a reference to the BSON binary value at the given index or returns an error if the
    /// value at that index isn't a binary.
    pub fn get_binary(&self, index: usize) -> Result<RawBinaryRef<'_>> {
        self.get_with(index, ElementType::Binary, RawBsonRef::as_binary)
    }

    /// Gets the ObjectId at the given index or returns an error if the value at that index isn't
    /// an ObjectId.
    pub fn get_object_id(&self, index: usize) -> Result<ObjectId> {
        self.get_with(index, ElementType::ObjectId, RawBsonRef::as_object_id)
    }

    /// Gets the boolean at the given index or returns an error if the value at that index isn't a
    /// boolean.
    pub fn get_bool(&self, index: usize) -> Result<bool> {
        self.get_with(index, ElementType::Boolean, RawBsonRef::as_bool)
    }

    /// Gets the DateTime, in milliseconds since the Unix epoch, at the given index or returns an
    /// error if the value at that index isn't a DateTime.
    pub fn get_datetime(&self, index: usize) -> Result<i64> {
        self.get_with(index, ElementType::DateTime, RawBsonRef::as_datetime)
    }

    /// Gets a reference to the BSON regex at the given index or returns an error if the
    /// value at that index isn't a regex.
    pub fn get_regex(&self, index: usize) -> Result<RawRegexRef<'_>> {
        self.get_with(index, ElementType::RegularExpression, RawBsonRef::as_regex)
    }

    /// Gets a reference to the BSON timestamp at the given index or returns an error if the
    /// value at that index isn't a timestamp.
    pub fn get_timestamp(&self, index: usize) -> Result<Timestamp> {
        self.get_with(index, ElementType::Timestamp, RawBsonRef::as_timestamp)
    }

    /// Gets the BSON int32 at the given index or returns an error if the value at that index isn't
    /// a 32-bit integer.
    pub fn get_i32(&self, index: usize) -> Result<i32> {
        self.get_with(index, ElementType::Int32, RawBsonRef::as_i32)
    }

    /// Gets BSON int64 at the given index or returns an error if the value at that index isn't a
    /// 64-bit integer.
    pub fn get_i64(&self, index: usize) -> Result<i64> {
        self.get_with(index, ElementType::Int64, RawBsonRef::as_i64)
    }

    /// Whether this array has no elements.
    pub fn is_empty(&self) -> bool {
        self.doc.is_empty()
    }

    /// Gets a reference to the raw bytes of the [`RawArray`].
    pub fn as_bytes(&self) -> &[u8] {
        self.doc.as_bytes()
    }

    /// Views this array as the document it is encoded as.
    pub fn as_doc(&self) -> &RawDocument {
        &self.doc
    }

    /// Walks the whole array, including nested values, and returns the first malformed-input
    /// error found.
    pub fn validate(&self) -> Result<()> {
        self.doc.validate()
    }
}

impl std::fmt::Debug for RawArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawArray")
            .field("data", &hex::encode(self.doc.as_bytes()))
            .finish()
    }
}

impl AsRef<RawArray> for RawArray {
    fn as_ref(&self) -> &RawArray {
        self
    }
}

impl ToOwned for RawArray {
    type Owned = RawArrayBuf;

    fn to_owned(&self) -> Self::Owned {
        self.to_raw_array_buf()
    }
}

impl<'a> IntoIterator for &'a RawArray {
    type IntoIter = RawArrayIter<'a>;
    type Item = RawArrayElement<'a>;

    fn into_iter(self) -> RawArrayIter<'a> {
        self.iter()
    }
}

/// An element of a [`RawArray`]: a cursor together with its position in the array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawArrayElement<'a> {
    element: RawElement<'a>,
    index: usize,
}

impl<'a> RawArrayElement<'a> {
    /// The position of this element in its array.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The key of this element, which is always the decimal string of its index regardless of
    /// the key stored in the bytes.
    pub fn key(&self) -> Cow<'a, str> {
        self.key_string()
    }
}

impl<'a> ElementAccess<'a> for RawArrayElement<'a> {
    fn raw(&self) -> RawElement<'a> {
        self.element
    }

    fn key_string(&self) -> Cow<'a, str> {
        Cow::Owned(self.index.to_string())
    }

    fn annotate(&self, error: Error) -> Error {
        error.with_index(self.index)
    }
}

/// An iterator over the elements of a [`RawArray`].
pub struct RawArrayIter<'a> {
    inner: RawIter<'a>,
    index: usize,
}

impl RawArrayIter<'_> {
    /// The error that ended iteration early, if any.
    pub fn error(&self) -> Option<&Error> {
        self.inner.error()
    }
}

impl<'a> Iterator for RawArrayIter<'a> {
    type Item = RawArrayElement<'a>;

    fn next(&mut self) -> Option<RawArrayElement<'a>> {
        let element = self.inner.next()?;
        let index = self.index;
        self.index += 1;
        Some(RawArrayElement { element, index })
    }
}

impl FusedIterator for RawArrayIter<'_> {}

use std::borrow::Cow;

use super::{
    check_framing,
    RawArray,
    RawBinaryRef,
    RawBsonRef,
    RawDocumentBuf,
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

/// A slice of a BSON document (akin to [`std::str`]). This can be created from a
/// [`RawDocumentBuf`] or any type that contains BSON data, including static binary literals,
/// [Vec<u8>](std::vec::Vec), or arrays.
///
/// This is an _unsized_ type, meaning that it must always be used behind a pointer like `&`. For an
/// owned version of this type, see [`RawDocumentBuf`].
///
/// The contents are parsed during iteration instead of at creation time. Iterating over a
/// [`RawDocument`] yields [`RawElement`] cursors that borrow from the original document without
/// making any additional allocations; every call to [`RawDocument::iter`] starts over from the
/// first element.
///
/// Individual elements can be accessed using [`RawDocument::find`], [`RawDocument::get`] or any of
/// the type-specific getters, such as [`RawDocument::get_object_id`] or
/// [`RawDocument::get_str`]. Note that accessing elements is an O(N) operation, as it
/// requires iterating through the document from the beginning to find the requested key.
///
/// Two documents compare equal when their bytes are identical; documents holding the same keys
/// in a different order are not equal.
#[derive(PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct RawDocument {
    data: [u8],
}

impl RawDocument {
    /// Constructs a new [`RawDocument`], validating _only_ the
    /// following invariants:
    ///   * `data` is at least five bytes long (the minimum for a valid BSON document)
    ///   * the initial four bytes of `data` accurately represent the length of the bytes as
    ///     required by the BSON spec.
    ///   * the last byte of `data` is a 0
    ///
    /// Note that the internal structure of the bytes representing the
    /// BSON elements is _not_ validated at all by this method. Use [`RawDocument::validate`] for a
    /// full structural check.
    ///
    /// ```
    /// use rawbson::raw::RawDocument;
    ///
    /// let doc = RawDocument::from_bytes(b"\x05\0\0\0\0")?;
    /// assert!(doc.is_empty());
    /// assert!(RawDocument::from_bytes(b"\x06\0\0\0\0").is_err());
    /// # Ok::<(), rawbson::error::Error>(())
    /// ```
    pub fn from_bytes<D: AsRef<[u8]> + ?Sized>(data: &D) -> Result<&RawDocument> {
        let data = data.as_ref();
        check_framing(data)?;
        Ok(RawDocument::from_bytes_unchecked(data))
    }

    /// Creates a new [`RawDocument`] referencing the provided data slice without checking it.
    ///
    /// This is always memory safe: a document whose framing is invalid behaves as an empty
    /// document, and iteration ends at the first element that does not fit in the buffer.
    pub fn from_bytes_unchecked<D: AsRef<[u8]> + ?Sized>(data: &D) -> &RawDocument {
        // SAFETY:
        //
        // Dereferencing a raw pointer requires unsafe due to the potential that the pointer is
        // null, dangling, or misaligned. We know the pointer is not null or dangling due to the
        // fact that it's created by a safe reference. Converting &[u8] to *const [u8] will be
        // properly aligned due to them being references to the same type, and converting *const
        // [u8] to *const RawDocument is aligned due to the fact that the only field in a
        // RawDocument is a [u8] and it is #[repr(transparent), meaning the structs are represented
        // identically at the byte level.
        unsafe { &*(data.as_ref() as *const [u8] as *const RawDocument) }
    }

    /// Creates a new [`RawDocumentBuf`] with an owned copy of the BSON bytes.
    pub fn to_raw_document_buf(&self) -> RawDocumentBuf {
        RawDocumentBuf::from_vec_unchecked(self.data.to_vec())
    }

    /// Gets an iterator over the elements of this document, starting at the first element.
    pub fn iter(&self) -> RawIter<'_> {
        RawIter::new(self)
    }

    /// Finds the first element with the given key by iterating from the start of the document.
    ///
    /// Returns `None` if the key is absent or if a malformed element is reached first.
    pub fn find(&self, key: impl AsRef<str>) -> Option<RawElement<'_>> {
        let key = key.as_ref();
        self.iter().find(|element| element.key() == key)
    }

    /// Gets a reference to the value corresponding to the given key by iterating until the key is
    /// found.
    ///
    /// Unlike [`RawDocument::find`], this reports malformed data encountered before the key, and
    /// malformed data in the value itself, as an error.
    pub fn get(&self, key: impl AsRef<str>) -> Result<Option<RawBsonRef<'_>>> {
        let key = key.as_ref();
        let mut iter = self.iter();
        for element in &mut iter {
            if element.key() == key {
                return element.value().map(Some);
            }
        }
        match iter.take_error() {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }

    fn get_with<'a, T>(
        &'a self,
        key: impl AsRef<str>,
        expected_type: ElementType,
        f: impl FnOnce(RawBsonRef<'a>) -> Option<T>,
    ) -> Result<T> {
        let key = key.as_ref();

        let bson = self
            .get(key)
            .map_err(|e| Error::value_access_invalid_bson(e.to_string()).with_key(key))?
            .ok_or_else(|| Error::value_access_not_present().with_key(key))?;
        match f(bson) {
            Some(t) => Ok(t),
            None => Err(
                Error::value_access_unexpected_type(bson.element_type(), expected_type)
                    .with_key(key),
            ),
        }
    }

    /// Gets the BSON double value corresponding to a given key or returns an error
    /// if the key corresponds to a value which isn't a double.
    pub fn get_f64(&self, key: impl AsRef<str>) -> Result<f64> {
        self.get_with(key, ElementType::Double, RawBsonRef::as_f64)
    }

    /// Gets a reference to the string value corresponding to a given key or returns an error if the
    /// key corresponds to a value which isn't a string.
    pub fn get_str(&self, key: impl AsRef<str>) -> Result<&'_ str> {
        self.get_with(key, ElementType::String, RawBsonRef::as_str)
    }

    /// Gets a reference to the document value corresponding to a given key or returns an error if
    /// the key corresponds to a value which isn't a document.
    ///
    /// ```
    /// use rawbson::{builder::DocumentStream, error::ValueAccessErrorKind, error::ErrorKind};
    ///
    /// let doc = DocumentStream::new()
    ///     .key("doc")
    ///     .open_document()
    ///     .key("key")
    ///     .append("value")
    ///     .close_document()
    ///     .key("bool")
    ///     .append(true)
    ///     .extract()?;
    ///
    /// assert_eq!(doc.get_document("doc")?.get_str("key")?, "value");
    /// assert!(matches!(
    ///     doc.get_document("bool").unwrap_err().kind,
    ///     ErrorKind::ValueAccess { kind: ValueAccessErrorKind::UnexpectedType { .. }, .. }
    /// ));
    /// # Ok::<(), rawbson::error::Error>(())
    /// ```
    pub fn get_document(&self, key: impl AsRef<str>) -> Result<&'_ RawDocument> {
        self.get_with(key, ElementType::EmbeddedDocument, RawBsonRef::as_document)
    }

    /// Gets a reference to the array value corresponding to a given key or returns an error if
    /// the key corresponds to a value which isn't an array.
    pub fn get_array(&self, key: impl AsRef<str>) -> Result<&'_ RawArray> {
        self.get_with(key, ElementType::Array, RawBsonRef::as_array)
    }

    /// Gets a reference to the BSON binary value corresponding to a given key or returns an error
    /// if the key corresponds to a value which isn't a binary value.
    pub fn get_binary(&self, key: impl AsRef<str>) -> Result<RawBinaryRef<'_>> {
        self.get_with(key, ElementType::Binary, RawBsonRef::as_binary)
    }

    /// Gets the ObjectId value corresponding to a given key or returns an error if
    /// the key corresponds to a value which isn't an ObjectId.
    pub fn get_object_id(&self, key: impl AsRef<str>) -> Result<ObjectId> {
        self.get_with(key, ElementType::ObjectId, RawBsonRef::as_object_id)
    }

    /// Gets the boolean value corresponding to a given key or returns an error if
    /// the key corresponds to a value which isn't a boolean.
    pub fn get_bool(&self, key: impl AsRef<str>) -> Result<bool> {
        self.get_with(key, ElementType::Boolean, RawBsonRef::as_bool)
    }

    /// Gets the DateTime value, in milliseconds since the Unix epoch, corresponding to a given
    /// key or returns an error if the key corresponds to a value which isn't a DateTime.
    pub fn get_datetime(&self, key: impl AsRef<str>) -> Result<i64> {
        self.get_with(key, ElementType::DateTime, RawBsonRef::as_datetime)
    }

    /// Gets a reference to the BSON regex value corresponding to a given key or returns an error if
    /// the key corresponds to a value which isn't a regex.
    pub fn get_regex(&self, key: impl AsRef<str>) -> Result<RawRegexRef<'_>> {
        self.get_with(key, ElementType::RegularExpression, RawBsonRef::as_regex)
    }

    /// Gets the BSON timestamp value corresponding to a given key or returns an
    /// error if the key corresponds to a value which isn't a timestamp.
    pub fn get_timestamp(&self, key: impl AsRef<str>) -> Result<Timestamp> {
        self.get_with(key, ElementType::Timestamp, RawBsonRef::as_timestamp)
    }

    /// Gets the BSON int32 value corresponding to a given key or returns an error if
    /// the key corresponds to a value which isn't a 32-bit integer.
    pub fn get_i32(&self, key: impl AsRef<str>) -> Result<i32> {
        self.get_with(key, ElementType::Int32, RawBsonRef::as_i32)
    }

    /// Gets the BSON int64 value corresponding to a given key or returns an error if
    /// the key corresponds to a value which isn't a 64-bit integer.
    pub fn get_i64(&self, key: impl AsRef<str>) -> Result<i64> {
        self.get_with(key, ElementType::Int64, RawBsonRef::as_i64)
    }

    /// Whether this document has no elements. A document with invalid framing is empty.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Return a reference to the contained data as a `&[u8]`
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Walks the whole document, including nested documents, arrays and code-with-scope scopes,
    /// and returns the first malformed-input error found.
    ///
    /// ```
    /// use rawbson::raw::RawDocument;
    ///
    /// // the string's length prefix claims more bytes than the document holds
    /// let doc = RawDocument::from_bytes(b"\x0e\0\0\0\x02a\0\xff\0\0\0b\0\0")?;
    /// assert!(doc.validate().is_err());
    /// assert_eq!(doc.iter().count(), 0);
    /// # Ok::<(), rawbson::error::Error>(())
    /// ```
    pub fn validate(&self) -> Result<()> {
        check_framing(self.as_bytes())?;

        let mut pending = vec![self];
        while let Some(doc) = pending.pop() {
            let mut iter = doc.iter();
            for element in &mut iter {
                match element.value()? {
                    RawBsonRef::Document(d) => pending.push(d),
                    RawBsonRef::Array(a) => pending.push(a.as_doc()),
                    RawBsonRef::JavaScriptCodeWithScope(c) => pending.push(c.scope),
                    _ => {}
                }
            }
            if let Some(e) = iter.take_error() {
                return Err(e);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for RawDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawDocument")
            .field("data", &hex::encode(&self.data))
            .finish()
    }
}

impl AsRef<RawDocument> for RawDocument {
    fn as_ref(&self) -> &RawDocument {
        self
    }
}

impl AsRef<[u8]> for RawDocument {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl ToOwned for RawDocument {
    type Owned = RawDocumentBuf;

    fn to_owned(&self) -> Self::Owned {
        self.to_raw_document_buf()
    }
}

impl<'a> From<&'a RawDocument> for Cow<'a, RawDocument> {
    fn from(rdr: &'a RawDocument) -> Self {
        Cow::Borrowed(rdr)
    }
}

impl PartialEq<RawDocumentBuf> for RawDocument {
    fn eq(&self, other: &RawDocumentBuf) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<'a> IntoIterator for &'a RawDocument {
    type IntoIter = RawIter<'a>;
    type Item = RawElement<'a>;

    fn into_iter(self) -> RawIter<'a> {
        self.iter()
    }
}

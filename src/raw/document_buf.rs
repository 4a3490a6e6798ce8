use std::{
    borrow::{Borrow, Cow},
    ops::Deref,
};

use super::{check_framing, RawBsonRef, RawDocument, RawElement, RawIter, RawWriter};
use crate::error::Result;

/// An owned BSON document (akin to [`std::path::PathBuf`]), backed by a buffer of raw BSON bytes.
/// This can be created from a `Vec<u8>`, from a [`Builder`](crate::builder::Builder), or by
/// appending key-value pairs to an empty document.
///
/// This type dereferences to [`RawDocument`], so all of the read accessors are available on it.
///
/// ```
/// use rawbson::raw::RawDocumentBuf;
///
/// let mut doc = RawDocumentBuf::new();
/// doc.append("a key", "a value")?;
/// doc.append("an int", 12)?;
/// assert_eq!(doc.get_i32("an int")?, 12);
///
/// let same = RawDocumentBuf::from_bytes(doc.clone().into_bytes())?;
/// assert_eq!(doc, same);
/// # Ok::<(), rawbson::error::Error>(())
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RawDocumentBuf {
    data: Vec<u8>,
}

impl RawDocumentBuf {
    /// Creates a new, empty [`RawDocumentBuf`].
    pub fn new() -> RawDocumentBuf {
        let mut data = Vec::new();
        data.extend(super::MIN_BSON_DOCUMENT_SIZE.to_le_bytes());
        data.push(0);
        Self { data }
    }

    /// Constructs a new [`RawDocumentBuf`], checking the same framing invariants as
    /// [`RawDocument::from_bytes`].
    pub fn from_bytes(data: Vec<u8>) -> Result<RawDocumentBuf> {
        check_framing(&data)?;
        Ok(Self { data })
    }

    pub(crate) fn from_vec_unchecked(data: Vec<u8>) -> RawDocumentBuf {
        Self { data }
    }

    /// Gets an iterator over the elements in the [`RawDocumentBuf`].
    pub fn iter(&self) -> RawIter<'_> {
        self.into_iter()
    }

    /// Return the contained data as a `Vec<u8>`
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Appends a key-value pair to the end of the document without checking to see if the key
    /// already exists.
    ///
    /// Fails if the key contains a null byte or if the document would grow past the maximum BSON
    /// size, in which case the document is left unchanged.
    pub fn append<'a>(
        &mut self,
        key: impl AsRef<str>,
        value: impl Into<RawBsonRef<'a>>,
    ) -> Result<()> {
        self.write(|writer| writer.append(key.as_ref(), value.into()))
    }

    fn write(&mut self, f: impl FnOnce(&mut RawWriter<'_>) -> Result<()>) -> Result<()> {
        check_framing(&self.data)?;

        // overwrite the trailing null byte; the writer leaves the buffer as it was on failure
        self.data.pop();
        let result = f(&mut RawWriter::new(&mut self.data));
        self.data.push(0);

        let new_len = (self.data.len() as i32).to_le_bytes();
        self.data[0..4].copy_from_slice(&new_len);
        result
    }
}

impl Default for RawDocumentBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RawDocumentBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawDocumentBuf")
            .field("data", &hex::encode(&self.data))
            .finish()
    }
}

impl<'a> From<RawDocumentBuf> for Cow<'a, RawDocument> {
    fn from(rd: RawDocumentBuf) -> Self {
        Cow::Owned(rd)
    }
}

impl<'a> From<&'a RawDocumentBuf> for Cow<'a, RawDocument> {
    fn from(rd: &'a RawDocumentBuf) -> Self {
        Cow::Borrowed(rd.as_ref())
    }
}

impl<'a> IntoIterator for &'a RawDocumentBuf {
    type IntoIter = RawIter<'a>;
    type Item = RawElement<'a>;

    fn into_iter(self) -> RawIter<'a> {
        self.deref().iter()
    }
}

impl AsRef<RawDocument> for RawDocumentBuf {
    fn as_ref(&self) -> &RawDocument {
        RawDocument::from_bytes_unchecked(&self.data)
    }
}

impl AsRef<[u8]> for RawDocumentBuf {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl Deref for RawDocumentBuf {
    type Target = RawDocument;

    fn deref(&self) -> &Self::Target {
        RawDocument::from_bytes_unchecked(&self.data)
    }
}

impl Borrow<RawDocument> for RawDocumentBuf {
    fn borrow(&self) -> &RawDocument {
        self.deref()
    }
}

impl PartialEq<RawDocument> for RawDocumentBuf {
    fn eq(&self, other: &RawDocument) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

use std::{
    borrow::{Borrow, Cow},
    fmt::Debug,
    ops::Deref,
};

use super::{RawArray, RawArrayIter, RawBsonRef, RawDocumentBuf};
use crate::error::Result;

/// An owned BSON array value (akin to [`std::path::PathBuf`]), backed by a buffer of raw BSON
/// bytes. This type can be used to construct owned array values, which can be used to append to
/// [`RawDocumentBuf`] or as a field in a document.
///
/// This type dereferences to [`RawArray`].
///
/// ```
/// use rawbson::raw::{ElementAccess, RawArrayBuf};
///
/// let mut array = RawArrayBuf::new();
/// array.push("a string")?;
/// array.push(12_i32)?;
///
/// let mut iter = array.iter();
/// assert_eq!(iter.next().unwrap().value()?.as_str(), Some("a string"));
/// assert_eq!(iter.next().unwrap().value()?.as_i32(), Some(12));
/// assert!(iter.next().is_none());
/// # Ok::<(), rawbson::error::Error>(())
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RawArrayBuf {
    inner: RawDocumentBuf,
    len: usize,
}

impl RawArrayBuf {
    /// Construct a new, empty [`RawArrayBuf`].
    pub fn new() -> RawArrayBuf {
        Self {
            inner: RawDocumentBuf::new(),
            len: 0,
        }
    }

    /// Constructs a new [`RawArrayBuf`], checking the same framing invariants as
    /// [`RawDocument::from_bytes`](super::RawDocument::from_bytes).
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Ok(Self::from_raw_document_buf(RawDocumentBuf::from_bytes(bytes)?))
    }

    pub(crate) fn from_raw_document_buf(doc: RawDocumentBuf) -> Self {
        let len = doc.iter().count();
        Self { inner: doc, len }
    }

    /// Appends a value to the end of the array under the next index.
    ///
    /// The array is left unchanged if the value cannot be written.
    pub fn push<'a>(&mut self, value: impl Into<RawBsonRef<'a>>) -> Result<()> {
        self.inner.append(self.len.to_string(), value)?;
        self.len += 1;
        Ok(())
    }

    /// Return the contained data as a `Vec<u8>`
    pub fn into_bytes(self) -> Vec<u8> {
        self.inner.into_bytes()
    }
}

impl Default for RawArrayBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for RawArrayBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawArrayBuf")
            .field("data", &hex::encode(self.as_bytes()))
            .field("len", &self.len)
            .finish()
    }
}

impl Deref for RawArrayBuf {
    type Target = RawArray;

    fn deref(&self) -> &Self::Target {
        RawArray::from_doc(&self.inner)
    }
}

impl AsRef<RawArray> for RawArrayBuf {
    fn as_ref(&self) -> &RawArray {
        RawArray::from_doc(&self.inner)
    }
}

impl Borrow<RawArray> for RawArrayBuf {
    fn borrow(&self) -> &RawArray {
        self.as_ref()
    }
}

impl<'a> IntoIterator for &'a RawArrayBuf {
    type IntoIter = RawArrayIter<'a>;
    type Item = super::RawArrayElement<'a>;

    fn into_iter(self) -> RawArrayIter<'a> {
        self.deref().iter()
    }
}

impl<'a> From<RawArrayBuf> for Cow<'a, RawArray> {
    fn from(rd: RawArrayBuf) -> Self {
        Cow::Owned(rd)
    }
}

impl<'a> From<&'a RawArrayBuf> for Cow<'a, RawArray> {
    fn from(rd: &'a RawArrayBuf) -> Self {
        Cow::Borrowed(rd.as_ref())
    }
}

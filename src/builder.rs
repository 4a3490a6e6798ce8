//! Construction of new BSON documents and arrays.
//!
//! [`Builder`] is the runtime builder: a single buffer plus a stack of open frames, checked at
//! every call. Misuse, such as closing an array while a document is open or appending a value to
//! a document without a key, is reported as a [`BuilderErrorKind`] from the call that detected it,
//! and a failed call leaves the builder exactly as it was.
//!
//! ```rust
//! use rawbson::builder::Builder;
//!
//! let mut builder = Builder::new_document();
//! builder.key("a")?;
//! builder.append(1)?;
//! builder.key("b")?;
//! builder.open_document()?;
//! builder.key("c")?;
//! builder.append("x")?;
//! builder.close_document()?;
//!
//! let doc = builder.extract_document()?;
//! assert_eq!(doc.get_document("b")?.get_str("c")?, "x");
//! # Ok::<(), rawbson::error::Error>(())
//! ```
//!
//! The [`stream`] module layers a typed front end over the same builder, in which structural
//! misuse does not compile.

pub mod stream;

use std::{fmt::Debug, ops::Range};

use crate::{
    binary::{VectorFormat, VectorViewMut},
    error::{BuilderErrorKind, Error, Result},
    raw::{
        check_cstring,
        check_framing,
        RawArray,
        RawArrayBuf,
        RawBsonRef,
        RawDocument,
        RawDocumentBuf,
        RawElement,
        RawWriter,
        MIN_BSON_DOCUMENT_SIZE,
    },
    spec::{BinarySubtype, ElementType},
};

pub use self::stream::{ArrayStream, DocumentStream, Stream};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FrameKind {
    Document,
    Array,
}

impl FrameKind {
    fn element_type(self) -> ElementType {
        match self {
            FrameKind::Document => ElementType::EmbeddedDocument,
            FrameKind::Array => ElementType::Array,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    kind: FrameKind,

    /// Offset of the frame's length prefix.
    start: usize,

    /// Number of elements appended to the frame so far.
    count: usize,
}

/// Builds a single BSON document or array.
///
/// While no nested frame is open the buffer always holds a complete, terminated root, which
/// [`view_document`](Builder::view_document) and [`view_array`](Builder::view_array) borrow
/// without copying. Opening a nested document or array writes it inline; closing it terminates
/// it and patches its length prefix.
#[derive(Clone)]
pub struct Builder {
    data: Vec<u8>,
    root: Frame,
    stack: Vec<Frame>,
    key: Option<String>,
}

impl Builder {
    /// Creates a builder whose root is a document.
    pub fn new_document() -> Self {
        Self::new(FrameKind::Document)
    }

    /// Creates a builder whose root is an array.
    pub fn new_array() -> Self {
        Self::new(FrameKind::Array)
    }

    fn new(kind: FrameKind) -> Self {
        let mut builder = Self {
            data: Vec::new(),
            root: Frame {
                kind,
                start: 0,
                count: 0,
            },
            stack: Vec::new(),
            key: None,
        };
        builder.clear();
        builder
    }

    /// Sets the key for the next value appended to the current document.
    ///
    /// Fails if the innermost open frame is an array, if a key is already waiting for its value,
    /// or if the key contains a null byte.
    pub fn key(&mut self, key: impl Into<String>) -> Result<()> {
        if self.current().kind == FrameKind::Array {
            return Err(misuse(BuilderErrorKind::CannotAppendKeyInSubArray));
        }
        if self.key.is_some() {
            return Err(misuse(BuilderErrorKind::UnmatchedKeyInBuilder));
        }

        let key = key.into();
        check_cstring(&key)?;
        self.key = Some(key);
        Ok(())
    }

    /// Appends a value under the pending key, or under the next index if the innermost open frame
    /// is an array.
    pub fn append<'a>(&mut self, value: impl Into<RawBsonRef<'a>>) -> Result<()> {
        let value = value.into();
        self.append_with(|writer, key| writer.append(key, value))
    }

    /// Opens a nested document as the next value.
    pub fn open_document(&mut self) -> Result<()> {
        self.open(FrameKind::Document)
    }

    /// Opens a nested array as the next value.
    pub fn open_array(&mut self) -> Result<()> {
        self.open(FrameKind::Array)
    }

    /// Closes the innermost open frame, which must be a document.
    pub fn close_document(&mut self) -> Result<()> {
        self.close(FrameKind::Document)
    }

    /// Closes the innermost open frame, which must be an array.
    pub fn close_array(&mut self) -> Result<()> {
        self.close(FrameKind::Array)
    }

    /// Copies the elements of `doc` into the innermost open frame.
    ///
    /// Into a document the elements are copied verbatim after checking the framing of `doc`; their
    /// values are not validated. Into an array each element is re-keyed with the next index, which
    /// requires every element of `doc` to be readable.
    pub fn concatenate(&mut self, doc: &RawDocument) -> Result<()> {
        if self.key.is_some() {
            return Err(misuse(BuilderErrorKind::UnmatchedKeyInBuilder));
        }
        let bytes = doc.as_bytes();
        check_framing(bytes)?;

        match self.current().kind {
            FrameKind::Document => {
                self.write(|writer| writer.append_raw_elements(&bytes[4..bytes.len() - 1]))?;
            }
            FrameKind::Array => {
                let mut iter = doc.iter();
                let elements: Vec<RawElement<'_>> = iter.by_ref().collect();
                if let Some(error) = iter.take_error() {
                    return Err(error);
                }

                let first = self.current().count;
                self.write(|writer| {
                    for (i, element) in elements.iter().enumerate() {
                        writer.append_element(&(first + i).to_string(), *element)?;
                    }
                    Ok(())
                })?;
                self.current_mut().count += elements.len();
            }
        }
        Ok(())
    }

    /// Appends a binary value with a zero-filled payload of `len` bytes and returns the payload
    /// for the caller to fill in place.
    pub fn append_binary_uninit(
        &mut self,
        subtype: BinarySubtype,
        len: usize,
    ) -> Result<&mut [u8]> {
        let range: Range<usize> =
            self.append_with(|writer, key| writer.append_binary_uninit(key, subtype, len))?;
        Ok(&mut self.data[range])
    }

    /// Appends a vector of `element_count` elements in format `F` and returns a view for writing
    /// its elements in place. Every element starts out zero.
    ///
    /// ```rust
    /// use rawbson::{binary::{PackedBit, VectorView}, builder::Builder};
    ///
    /// let mut builder = Builder::new_document();
    /// builder.key("bits")?;
    /// let mut vector = builder.append_vector::<PackedBit>(5)?;
    /// for i in 0..5 {
    ///     vector.set(i, true)?;
    /// }
    ///
    /// let doc = builder.extract_document()?;
    /// let bits = VectorView::<PackedBit>::new(doc.get_binary("bits")?)?;
    /// assert_eq!(bits.as_bytes(), [0b1111_1000]);
    /// # Ok::<(), rawbson::error::Error>(())
    /// ```
    pub fn append_vector<F: VectorFormat>(
        &mut self,
        element_count: usize,
    ) -> Result<VectorViewMut<'_, F>> {
        let len = F::length_for_append(element_count)? as usize;
        let bytes = self.append_binary_uninit(BinarySubtype::Vector, len)?;
        VectorViewMut::from_frame(bytes, element_count)
    }

    /// Borrows the finished document.
    ///
    /// Fails if a frame is still open, a key is waiting for its value, or the root is an array.
    pub fn view_document(&self) -> Result<&RawDocument> {
        self.check_finished(FrameKind::Document)?;
        Ok(RawDocument::from_bytes_unchecked(&self.data))
    }

    /// Borrows the finished array.
    ///
    /// Fails if a frame is still open, a key is waiting for its value, or the root is a document.
    pub fn view_array(&self) -> Result<&RawArray> {
        self.check_finished(FrameKind::Array)?;
        Ok(RawArray::from_doc(RawDocument::from_bytes_unchecked(
            &self.data,
        )))
    }

    /// Consumes the builder and returns the finished document.
    pub fn extract_document(self) -> Result<RawDocumentBuf> {
        self.check_finished(FrameKind::Document)?;
        Ok(RawDocumentBuf::from_vec_unchecked(self.data))
    }

    /// Consumes the builder and returns the finished array.
    pub fn extract_array(self) -> Result<RawArrayBuf> {
        self.check_finished(FrameKind::Array)?;
        Ok(RawArrayBuf::from_raw_document_buf(
            RawDocumentBuf::from_vec_unchecked(self.data),
        ))
    }

    /// Discards everything appended so far, keeping the kind of the root.
    pub fn clear(&mut self) {
        self.data.clear();
        self.data.extend(MIN_BSON_DOCUMENT_SIZE.to_le_bytes());
        self.data.push(0);
        self.root.count = 0;
        self.stack.clear();
        self.key = None;
    }

    /// The number of nested documents and arrays currently open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn current(&self) -> &Frame {
        self.stack.last().unwrap_or(&self.root)
    }

    fn current_mut(&mut self) -> &mut Frame {
        self.stack.last_mut().unwrap_or(&mut self.root)
    }

    fn check_finished(&self, kind: FrameKind) -> Result<()> {
        if !self.stack.is_empty() || self.key.is_some() {
            return Err(misuse(BuilderErrorKind::UnmatchedKeyInBuilder));
        }
        if self.root.kind != kind {
            return Err(misuse(match kind {
                FrameKind::Document => BuilderErrorKind::CannotPerformDocumentOperationOnArray,
                FrameKind::Array => BuilderErrorKind::CannotPerformArrayOperationOnDocument,
            }));
        }
        Ok(())
    }

    fn open(&mut self, kind: FrameKind) -> Result<()> {
        let start =
            self.append_with(|writer, key| writer.open_frame(kind.element_type(), key))?;
        if self.stack.is_empty() {
            // the root stays unterminated while a nested frame is open
            self.data.pop();
        }
        self.stack.push(Frame {
            kind,
            start,
            count: 0,
        });
        Ok(())
    }

    fn close(&mut self, kind: FrameKind) -> Result<()> {
        if self.current().kind != kind {
            return Err(misuse(match kind {
                FrameKind::Document => BuilderErrorKind::CannotCloseDocumentInSubArray,
                FrameKind::Array => BuilderErrorKind::CannotCloseArrayInSubDocument,
            }));
        }
        let Some(frame) = self.stack.last().copied() else {
            return Err(misuse(match kind {
                FrameKind::Document => BuilderErrorKind::NoDocumentToClose,
                FrameKind::Array => BuilderErrorKind::NoArrayToClose,
            }));
        };
        if self.key.is_some() {
            return Err(misuse(BuilderErrorKind::UnmatchedKeyInBuilder));
        }

        self.data.push(0);
        patch_len(&mut self.data, frame.start);
        self.stack.pop();
        if self.stack.is_empty() {
            self.terminate();
        }
        Ok(())
    }

    /// Writes one element under the key it is owed: the pending key in a document, the next index
    /// in an array. The key is only consumed if the write succeeds.
    fn append_with<T>(
        &mut self,
        f: impl FnOnce(&mut RawWriter<'_>, &str) -> Result<T>,
    ) -> Result<T> {
        let key = match self.current().kind {
            FrameKind::Array => self.current().count.to_string(),
            FrameKind::Document => self
                .key
                .take()
                .ok_or_else(|| misuse(BuilderErrorKind::NeedKey))?,
        };

        match self.write(|writer| f(writer, &key)) {
            Ok(t) => {
                self.current_mut().count += 1;
                Ok(t)
            }
            Err(e) => {
                if self.current().kind == FrameKind::Document {
                    self.key = Some(key);
                }
                Err(e)
            }
        }
    }

    fn write<T>(&mut self, f: impl FnOnce(&mut RawWriter<'_>) -> Result<T>) -> Result<T> {
        let at_root = self.stack.is_empty();
        if at_root {
            self.data.pop();
        }

        let original_len = self.data.len();
        let result = f(&mut RawWriter::with_reserve(
            &mut self.data,
            self.stack.len() + 1,
        ));
        if result.is_err() {
            self.data.truncate(original_len);
        }

        if at_root {
            self.terminate();
        }
        result
    }

    fn terminate(&mut self) {
        self.data.push(0);
        patch_len(&mut self.data, self.root.start);
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new_document()
    }
}

impl Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("data", &hex::encode(&self.data))
            .field("depth", &self.stack.len())
            .field("key", &self.key)
            .finish()
    }
}

fn patch_len(data: &mut [u8], start: usize) {
    let len = ((data.len() - start) as i32).to_le_bytes();
    data[start..start + 4].copy_from_slice(&len);
}

fn misuse(kind: BuilderErrorKind) -> Error {
    tracing::debug!(?kind, "builder misuse");
    Error::builder(kind)
}

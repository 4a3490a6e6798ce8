//! A typed front end for [`Builder`] in which the type of each intermediate expression records
//! what may legally come next.
//!
//! A [`DocumentStream`] alternates between expecting a key and expecting a value, and every
//! nested document or array remembers the frame it was opened in, so closing it returns to the
//! parent's type. Only a stream back at its root can be extracted.
//!
//! ```rust
//! use rawbson::builder::DocumentStream;
//!
//! let doc = DocumentStream::new()
//!     .key("name")
//!     .append("rawbson")
//!     .key("tags")
//!     .open_array()
//!     .append("bson")
//!     .append("raw")
//!     .close_array()
//!     .key("owner")
//!     .open_document()
//!     .key("id")
//!     .append(7)
//!     .close_document()
//!     .extract()?;
//!
//! assert_eq!(doc.get_array("tags")?.get_str(1)?, "raw");
//! assert_eq!(doc.get_document("owner")?.get_i32("id")?, 7);
//! # Ok::<(), rawbson::error::Error>(())
//! ```
//!
//! Two keys in a row do not compile:
//!
//! ```compile_fail
//! use rawbson::builder::DocumentStream;
//!
//! let doc = DocumentStream::new().key("a").key("b").append(1).extract();
//! ```
//!
//! Neither does closing a document while an array is open:
//!
//! ```compile_fail
//! use rawbson::builder::DocumentStream;
//!
//! let doc = DocumentStream::new().key("a").open_array().close_document().extract();
//! ```
//!
//! Nor extracting while a nested frame is open:
//!
//! ```compile_fail
//! use rawbson::builder::DocumentStream;
//!
//! let doc = DocumentStream::new().key("a").open_document().extract();
//! ```
//!
//! Errors that depend on the values themselves, such as a key containing a null byte, are held by
//! the stream and returned from `extract`. Once a call has failed, later calls are ignored.

use std::marker::PhantomData;

use super::Builder;
use crate::{
    binary::VectorFormat,
    error::{Error, Result},
    raw::{RawArrayBuf, RawBsonRef, RawDocument, RawDocumentBuf},
};

/// A stream building a document at its root.
pub type DocumentStream = Stream<Doc<Root>>;

/// A stream building an array at its root.
pub type ArrayStream = Stream<Arr<Root>>;

/// The outermost frame.
#[derive(Debug)]
pub enum Root {}

/// Inside a document opened in frame `P`, expecting a key.
#[derive(Debug)]
pub struct Doc<P>(PhantomData<P>);

/// Inside an array opened in frame `P`.
#[derive(Debug)]
pub struct Arr<P>(PhantomData<P>);

/// After a key in frame `C`, expecting a value.
#[derive(Debug)]
pub struct Value<C>(PhantomData<C>);

mod sealed {
    pub trait Sealed {}
    impl<P> Sealed for super::Doc<P> {}
    impl<P> Sealed for super::Arr<P> {}
}

/// A frame that a nested document or array can be closed back into. This trait is sealed.
pub trait Frame: sealed::Sealed {}
impl<P> Frame for Doc<P> {}
impl<P> Frame for Arr<P> {}

/// A [`Builder`] whose state `S` is tracked in its type.
#[derive(Debug)]
pub struct Stream<S> {
    core: Builder,
    error: Option<Error>,
    _state: PhantomData<S>,
}

impl<S> Stream<S> {
    fn then<T>(mut self, f: impl FnOnce(&mut Builder) -> Result<()>) -> Stream<T> {
        if self.error.is_none() {
            if let Err(e) = f(&mut self.core) {
                self.error = Some(e);
            }
        }
        Stream {
            core: self.core,
            error: self.error,
            _state: PhantomData,
        }
    }

    fn append_vector_with<T, F: VectorFormat>(self, elements: &[F::Element]) -> Stream<T> {
        self.then(|core| {
            let mut vector = core.append_vector::<F>(elements.len())?;
            for (i, element) in elements.iter().enumerate() {
                vector.set(i, *element)?;
            }
            Ok(())
        })
    }
}

impl Stream<Doc<Root>> {
    pub fn new() -> Self {
        Stream {
            core: Builder::new_document(),
            error: None,
            _state: PhantomData,
        }
    }

    /// Returns the finished document, or the first error encountered while building it.
    pub fn extract(self) -> Result<RawDocumentBuf> {
        match self.error {
            Some(e) => Err(e),
            None => self.core.extract_document(),
        }
    }
}

impl Default for Stream<Doc<Root>> {
    fn default() -> Self {
        Self::new()
    }
}

impl Stream<Arr<Root>> {
    pub fn new() -> Self {
        Stream {
            core: Builder::new_array(),
            error: None,
            _state: PhantomData,
        }
    }

    /// Returns the finished array, or the first error encountered while building it.
    pub fn extract(self) -> Result<RawArrayBuf> {
        match self.error {
            Some(e) => Err(e),
            None => self.core.extract_array(),
        }
    }
}

impl Default for Stream<Arr<Root>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Stream<Doc<P>> {
    pub fn key(self, key: impl Into<String>) -> Stream<Value<Doc<P>>> {
        self.then(|core| core.key(key))
    }

    /// Copies the elements of `doc` into this document.
    pub fn concatenate(self, doc: &RawDocument) -> Self {
        self.then(|core| core.concatenate(doc))
    }
}

impl<P: Frame> Stream<Doc<P>> {
    pub fn close_document(self) -> Stream<P> {
        self.then(Builder::close_document)
    }
}

impl<P> Stream<Value<Doc<P>>> {
    pub fn append<'a>(self, value: impl Into<RawBsonRef<'a>>) -> Stream<Doc<P>> {
        self.then(|core| core.append(value))
    }

    pub fn open_document(self) -> Stream<Doc<Doc<P>>> {
        self.then(Builder::open_document)
    }

    pub fn open_array(self) -> Stream<Arr<Doc<P>>> {
        self.then(Builder::open_array)
    }

    /// Appends a binary vector of format `F` holding `elements`.
    pub fn append_vector<F: VectorFormat>(self, elements: &[F::Element]) -> Stream<Doc<P>> {
        self.append_vector_with::<_, F>(elements)
    }
}

impl<P> Stream<Arr<P>> {
    pub fn append<'a>(self, value: impl Into<RawBsonRef<'a>>) -> Self {
        self.then(|core| core.append(value))
    }

    pub fn open_document(self) -> Stream<Doc<Arr<P>>> {
        self.then(Builder::open_document)
    }

    pub fn open_array(self) -> Stream<Arr<Arr<P>>> {
        self.then(Builder::open_array)
    }

    /// Appends the values of `doc` to this array under the next indexes.
    pub fn concatenate(self, doc: &RawDocument) -> Self {
        self.then(|core| core.concatenate(doc))
    }

    /// Appends a binary vector of format `F` holding `elements`.
    ///
    /// ```rust
    /// use rawbson::{binary::{Int8, VectorView}, builder::ArrayStream};
    ///
    /// let array = ArrayStream::new()
    ///     .append_vector::<Int8>(&[1, 2, 3])
    ///     .extract()?;
    /// let vector = VectorView::<Int8>::new(array.get_binary(0)?)?;
    /// assert_eq!(vector.iter().collect::<Vec<_>>(), [1, 2, 3]);
    /// # Ok::<(), rawbson::error::Error>(())
    /// ```
    pub fn append_vector<F: VectorFormat>(self, elements: &[F::Element]) -> Self {
        self.append_vector_with::<_, F>(elements)
    }
}

impl<P: Frame> Stream<Arr<P>> {
    pub fn close_array(self) -> Stream<P> {
        self.then(Builder::close_array)
    }
}

// The MIT License (MIT)

// Copyright (c) 2015 Y. T. Chung <zonyitoo@gmail.com>

// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:

// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! BSON is a binary format in which zero or more key/value pairs are stored as a single entity.
//! We call this entity a document.
//!
//! This library works directly on the encoded bytes of version 1.0 of the
//! [BSON standard](http://bsonspec.org/spec.html). Documents are read through borrowed views that
//! never copy or parse ahead of what is asked for, and written through a builder that appends to a
//! single buffer.
//!
//! ## Basic usage
//!
//! ```rust
//! use rawbson::{builder::DocumentStream, raw::{ElementAccess, RawDocument}};
//!
//! let doc = DocumentStream::new()
//!     .key("a")
//!     .append(1)
//!     .key("b")
//!     .open_document()
//!     .key("c")
//!     .append("x")
//!     .close_document()
//!     .extract()?;
//!
//! // the bytes can be handed to anything that speaks BSON, and read back without copying
//! let view = RawDocument::from_bytes(doc.as_bytes())?;
//! let b = view.find("b").unwrap().get_document()?;
//! let c = b.iter().next().unwrap();
//! assert_eq!(c.key(), "c");
//! assert_eq!(c.get_str()?, "x");
//! # Ok::<(), rawbson::error::Error>(())
//! ```
//!
//! ## Modules
//!
//! * [`raw`]: borrowed and owned views of encoded documents and arrays, and the element cursor
//!   they are traversed with.
//! * [`builder`]: the runtime [`Builder`](builder::Builder) and its typed
//!   [`stream`](builder::stream) front end.
//! * [`binary`]: binary values and the vector codec for packed int8, float32 and bit vectors.
//! * [`json`]: relaxed extended JSON rendering for debugging.

pub use self::{
    binary::Binary,
    error::{Error, Result},
    raw::{RawArray, RawArrayBuf, RawBsonRef, RawDocument, RawDocumentBuf},
};

pub mod binary;
pub mod builder;
pub mod error;
pub mod json;
pub mod oid;
pub mod raw;
pub mod spec;

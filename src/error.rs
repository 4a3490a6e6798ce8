use thiserror::Error;

use crate::spec::ElementType;

pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur in the `rawbson` crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,

    /// The document key associated with the error, if any.
    pub key: Option<String>,

    /// The array index associated with the error, if any.
    pub index: Option<usize>,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(key) = self.key.as_deref() {
            write!(f, "Error at key \"{key}\": ")?;
        } else if let Some(index) = self.index {
            write!(f, "Error at array index {index}: ")?;
        }

        write!(f, "{}", self.kind)
    }
}

/// The types of errors that can occur in the `rawbson` crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed BSON bytes were encountered.
    #[error("Malformed BSON: {message}")]
    #[non_exhaustive]
    MalformedValue { message: String },

    /// Invalid UTF-8 bytes were encountered.
    #[error("Invalid UTF-8")]
    Utf8Encoding,

    /// An error occurred when attempting to access a value in a document.
    #[error("An error occurred when attempting to access a document value: {kind}")]
    #[non_exhaustive]
    ValueAccess {
        /// The kind of error that occurred.
        kind: ValueAccessErrorKind,
    },

    /// A builder operation was called in a state that does not permit it.
    #[error("Builder misuse: {kind}")]
    #[non_exhaustive]
    Builder {
        /// The kind of misuse that was detected.
        kind: BuilderErrorKind,
    },

    /// Binary data could not be interpreted as a vector of the requested format.
    #[error("invalid BSON vector: {message}")]
    #[non_exhaustive]
    Vector { message: String },

    /// The requested vector cannot be represented in a BSON binary value.
    #[error("BSON vector too large: {message}")]
    #[non_exhaustive]
    VectorTooLarge { message: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            key: None,
            index: None,
        }
    }
}

/// The types of errors that can occur when attempting to access a value in a document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ValueAccessErrorKind {
    /// No value for the specified key was present in the document.
    #[error("The key was not present in the document")]
    NotPresent,

    /// The type of the value in the document did not match the requested type.
    #[error("Expected type {expected:?}, got type {actual:?}")]
    #[non_exhaustive]
    UnexpectedType {
        /// The actual type of the value.
        actual: ElementType,

        /// The expected type of the value.
        expected: ElementType,
    },

    /// An error occurred when attempting to parse the document's BSON bytes.
    #[error("{message}")]
    #[non_exhaustive]
    InvalidBson { message: String },
}

/// Structural misuse of a [`Builder`](crate::builder::Builder).
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum BuilderErrorKind {
    /// A key was provided while building an array.
    #[error("cannot append key in sub-array")]
    CannotAppendKeyInSubArray,

    /// An array was closed while the innermost open frame is a document.
    #[error("cannot close array in sub-document")]
    CannotCloseArrayInSubDocument,

    /// A document was closed while the innermost open frame is an array.
    #[error("cannot close document in sub-array")]
    CannotCloseDocumentInSubArray,

    /// An array operation was performed on a builder whose root is a document.
    #[error("cannot perform array operation on document")]
    CannotPerformArrayOperationOnDocument,

    /// A document operation was performed on a builder whose root is an array.
    #[error("cannot perform document operation on array")]
    CannotPerformDocumentOperationOnArray,

    /// A value was appended to a document without a preceding key.
    #[error("need key")]
    NeedKey,

    /// An array was closed while no array was open.
    #[error("no array to close")]
    NoArrayToClose,

    /// A document was closed while no document was open.
    #[error("no document to close")]
    NoDocumentToClose,

    /// The builder was viewed or extracted while a key was awaiting a value or a frame was
    /// still open, or a second key was provided before the first one received a value.
    #[error("unmatched key in builder")]
    UnmatchedKeyInBuilder,

    /// The value does not fit in a BSON document.
    #[error("value too large for a BSON document")]
    ValueTooLarge,
}

impl Error {
    pub(crate) fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub(crate) fn value_access_not_present() -> Self {
        ErrorKind::ValueAccess {
            kind: ValueAccessErrorKind::NotPresent,
        }
        .into()
    }

    pub(crate) fn value_access_unexpected_type(actual: ElementType, expected: ElementType) -> Self {
        ErrorKind::ValueAccess {
            kind: ValueAccessErrorKind::UnexpectedType { actual, expected },
        }
        .into()
    }

    pub(crate) fn value_access_invalid_bson(message: String) -> Self {
        ErrorKind::ValueAccess {
            kind: ValueAccessErrorKind::InvalidBson { message },
        }
        .into()
    }

    pub(crate) fn malformed_bytes(message: impl ToString) -> Self {
        ErrorKind::MalformedValue {
            message: message.to_string(),
        }
        .into()
    }

    pub(crate) fn builder(kind: BuilderErrorKind) -> Self {
        ErrorKind::Builder { kind }.into()
    }

    pub(crate) fn vector(message: impl ToString) -> Self {
        ErrorKind::Vector {
            message: message.to_string(),
        }
        .into()
    }

    pub(crate) fn vector_too_large(message: impl ToString) -> Self {
        ErrorKind::VectorTooLarge {
            message: message.to_string(),
        }
        .into()
    }

    /// The builder misuse kind, if this error was produced by a builder.
    pub fn builder_kind(&self) -> Option<BuilderErrorKind> {
        match self.kind {
            ErrorKind::Builder { kind } => Some(kind),
            _ => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_malformed_value(&self) -> bool {
        matches!(self.kind, ErrorKind::MalformedValue { .. })
    }

    #[cfg(test)]
    pub(crate) fn is_value_access_not_present(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ValueAccess {
                kind: ValueAccessErrorKind::NotPresent,
                ..
            }
        )
    }

    #[cfg(test)]
    pub(crate) fn is_value_access_unexpected_type(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ValueAccess {
                kind: ValueAccessErrorKind::UnexpectedType { .. },
                ..
            }
        )
    }

    #[cfg(test)]
    pub(crate) fn is_vector(&self) -> bool {
        matches!(self.kind, ErrorKind::Vector { .. })
    }
}

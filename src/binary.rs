//! Owned BSON binary values and the binary vector codec.

pub mod vector;

use std::fmt::{self, Display};

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::{
    error::{Error, Result},
    raw::RawBinaryRef,
    spec::BinarySubtype,
};

pub use self::vector::{
    Float32,
    Int8,
    PackedBit,
    PackedBitVector,
    Vector,
    VectorElementSize,
    VectorElementType,
    VectorFormat,
    VectorHeader,
    VectorView,
    VectorViewMut,
};

/// Represents a BSON binary value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binary {
    /// The subtype of the bytes.
    pub subtype: BinarySubtype,

    /// The binary bytes.
    pub bytes: Vec<u8>,
}

impl Display for Binary {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmt,
            "Binary({:#x}, {})",
            u8::from(self.subtype),
            STANDARD.encode(&self.bytes)
        )
    }
}

impl Binary {
    /// Creates a [`Binary`] from a base64 string and optional [`BinarySubtype`]. If the
    /// `subtype` argument is [`None`], the [`Binary`] constructed will default to
    /// [`BinarySubtype::Generic`].
    ///
    /// ```rust
    /// # use rawbson::binary::Binary;
    /// let binary = Binary::from_base64("aGVsbG8=", None)?;
    /// assert_eq!(binary.bytes, b"hello");
    /// # Ok::<(), rawbson::error::Error>(())
    /// ```
    pub fn from_base64(
        input: impl AsRef<str>,
        subtype: impl Into<Option<BinarySubtype>>,
    ) -> Result<Self> {
        let bytes = STANDARD
            .decode(input.as_ref())
            .map_err(|e| Error::malformed_bytes(format!("invalid base64: {}", e)))?;
        let subtype = match subtype.into() {
            Some(s) => s,
            None => BinarySubtype::Generic,
        };
        Ok(Binary { subtype, bytes })
    }

    /// Borrows this value as a [`RawBinaryRef`].
    pub fn as_raw_binary(&self) -> RawBinaryRef<'_> {
        RawBinaryRef {
            subtype: self.subtype,
            bytes: self.bytes.as_slice(),
        }
    }
}

impl From<RawBinaryRef<'_>> for Binary {
    fn from(binary: RawBinaryRef<'_>) -> Self {
        Self {
            subtype: binary.subtype,
            bytes: binary.bytes.to_vec(),
        }
    }
}

//! The BSON binary vector format.
//!
//! A vector is stored in a binary value of subtype [`BinarySubtype::Vector`]. Its payload starts
//! with a two-byte [`VectorHeader`]: the first byte packs the element type into the high nibble
//! and the element size into the low nibble, and the second byte holds the number of unused low
//! bits in the final byte of a packed-bit vector. Three formats are defined, each represented
//! here by a marker type implementing [`VectorFormat`]:
//!
//! | Format        | Element          | Data type byte | Padding                |
//! |---------------|------------------|----------------|------------------------|
//! | [`Int8`]      | `i8`             | `0x03`         | always 0               |
//! | [`Float32`]   | `f32`, LE        | `0x27`         | always 0               |
//! | [`PackedBit`] | `bool`, MSB first| `0x10`         | `(8 - count % 8) % 8`  |
//!
//! Payloads are never trusted: [`VectorFormat::validate`] re-derives the header from the bytes
//! and rejects any length, padding or trailing-bit mismatch.
//!
//! ```rust
//! use rawbson::binary::{vector::{Int8, VectorView}, Binary, Vector};
//!
//! let binary = Binary::from(Vector::Int8(vec![1, 2, 3]));
//! assert_eq!(binary.bytes, [0x03, 0x00, 0x01, 0x02, 0x03]);
//!
//! let view = VectorView::<Int8>::new(binary.as_raw_binary())?;
//! assert_eq!(view.iter().collect::<Vec<_>>(), [1, 2, 3]);
//! # Ok::<(), rawbson::error::Error>(())
//! ```
//!
//! See the
//! [specification](https://github.com/mongodb/specifications/blob/master/source/bson-binary-vector/bson-binary-vector.md)
//! for more details.

#[cfg(test)]
mod test;

use std::{fmt, marker::PhantomData, mem::size_of};

use bitvec::{order::Msb0, view::BitView};

use super::Binary;
use crate::{
    error::{Error, Result},
    raw::{RawBinaryRef, MAX_BSON_SIZE},
    spec::BinarySubtype,
};

/// The number of bytes in a vector header.
pub const HEADER_SIZE: usize = 2;

const INT8: u8 = 0x03;
const FLOAT32: u8 = 0x27;
const PACKED_BIT: u8 = 0x10;

/// The kind of number stored in each element of a vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VectorElementType {
    SignedInteger = 0,
    UnsignedInteger = 1,
    FloatingPoint = 2,
}

/// The width of each element of a vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VectorElementSize {
    Bits1 = 0,
    Bits8 = 3,
    Bits32 = 7,
}

/// The two bytes in front of every vector payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VectorHeader {
    pub element_type: VectorElementType,
    pub element_size: VectorElementSize,

    /// The number of unused low bits in the final payload byte.
    pub padding: u8,
}

impl VectorHeader {
    /// The first header byte.
    pub fn data_type(&self) -> u8 {
        ((self.element_type as u8) << 4) | self.element_size as u8
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        [self.data_type(), self.padding]
    }

    /// Parses a header, failing if the data type byte names an unknown element type or size.
    pub fn from_bytes(bytes: [u8; HEADER_SIZE]) -> Result<Self> {
        let element_type = match bytes[0] >> 4 {
            0 => VectorElementType::SignedInteger,
            1 => VectorElementType::UnsignedInteger,
            2 => VectorElementType::FloatingPoint,
            other => return Err(invalid(format!("unknown element type {:#x}", other))),
        };
        let element_size = match bytes[0] & 0x0f {
            0 => VectorElementSize::Bits1,
            3 => VectorElementSize::Bits8,
            7 => VectorElementSize::Bits32,
            other => return Err(invalid(format!("unknown element size {:#x}", other))),
        };
        Ok(Self {
            element_type,
            element_size,
            padding: bytes[1],
        })
    }
}

fn invalid(message: String) -> Error {
    tracing::debug!(%message, "rejected BSON vector");
    Error::vector(message)
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Int8 {}
    impl Sealed for super::Float32 {}
    impl Sealed for super::PackedBit {}
}

/// One of the three vector layouts. This trait is sealed.
pub trait VectorFormat: sealed::Sealed {
    /// The logical value of one element.
    type Element: Copy + fmt::Debug;

    const ELEMENT_TYPE: VectorElementType;
    const ELEMENT_SIZE: VectorElementSize;

    #[doc(hidden)]
    fn payload_len(element_count: usize) -> Option<usize>;

    #[doc(hidden)]
    fn padding(element_count: usize) -> u8;

    #[doc(hidden)]
    fn check_payload(payload: &[u8], padding: u8) -> Result<()>;

    #[doc(hidden)]
    fn read(payload: &[u8], index: usize) -> Self::Element;

    #[doc(hidden)]
    fn write(payload: &mut [u8], index: usize, value: Self::Element);

    /// The number of elements in a vector of `byte_len` bytes, header included, whose header has
    /// already been validated.
    fn element_count(byte_len: usize, header: VectorHeader) -> usize;

    /// The header of a vector with `element_count` elements.
    fn header(element_count: usize) -> VectorHeader {
        VectorHeader {
            element_type: Self::ELEMENT_TYPE,
            element_size: Self::ELEMENT_SIZE,
            padding: Self::padding(element_count),
        }
    }

    /// The number of bytes, header included, needed to store `element_count` elements.
    ///
    /// Fails with [`VectorTooLarge`](crate::error::ErrorKind::VectorTooLarge) if the result
    /// does not fit in a BSON binary value.
    fn length_for_append(element_count: usize) -> Result<u32> {
        Self::payload_len(element_count)
            .and_then(|len| len.checked_add(HEADER_SIZE))
            .filter(|len| *len <= MAX_BSON_SIZE as usize)
            .and_then(|len| u32::try_from(len).ok())
            .ok_or_else(|| {
                Error::vector_too_large(format!(
                    "{} elements do not fit in a binary value",
                    element_count
                ))
            })
    }

    /// Writes the header of an `element_count` element vector to the start of `bytes`, which must
    /// be exactly [`length_for_append`](VectorFormat::length_for_append) bytes long. The final
    /// byte of a packed-bit payload is cleared so the padding bits start out zero.
    fn write_frame(bytes: &mut [u8], element_count: usize) -> Result<VectorHeader> {
        let expected = Self::length_for_append(element_count)? as usize;
        if bytes.len() != expected {
            return Err(invalid(format!(
                "a vector of {} elements needs {} bytes, got {}",
                element_count,
                expected,
                bytes.len()
            )));
        }

        let header = Self::header(element_count);
        bytes[..HEADER_SIZE].copy_from_slice(&header.to_bytes());
        if Self::ELEMENT_SIZE == VectorElementSize::Bits1 && bytes.len() > HEADER_SIZE {
            bytes[expected - 1] = 0;
        }
        Ok(header)
    }

    /// Checks that `binary` holds a vector of this format and returns its header.
    fn validate(binary: RawBinaryRef<'_>) -> Result<VectorHeader> {
        if binary.subtype != BinarySubtype::Vector {
            return Err(invalid(format!(
                "expected vector binary subtype, got {:?}",
                binary.subtype
            )));
        }
        Self::validate_bytes(binary.bytes)
    }

    /// Like [`validate`](VectorFormat::validate), for the bytes of a binary value whose subtype
    /// has already been checked.
    fn validate_bytes(bytes: &[u8]) -> Result<VectorHeader> {
        if bytes.len() < HEADER_SIZE {
            return Err(invalid(format!(
                "the provided bytes must have a length of at least {}, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let header = VectorHeader::from_bytes([bytes[0], bytes[1]])?;
        if header.element_type != Self::ELEMENT_TYPE || header.element_size != Self::ELEMENT_SIZE
        {
            return Err(invalid(format!(
                "expected data type {:#04x}, got {:#04x}",
                Self::header(0).data_type(),
                header.data_type()
            )));
        }

        Self::check_payload(&bytes[HEADER_SIZE..], header.padding)?;
        Ok(header)
    }
}

/// Signed 8-bit integers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Int8;

/// Little-endian IEEE-754 single precision floats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Float32;

/// Single bits, most significant bit first within each byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PackedBit;

fn check_no_padding(padding: u8) -> Result<()> {
    if padding != 0 {
        return Err(invalid(format!(
            "padding can only be specified for a packed bit vector (data type {:#04x}), got {}",
            PACKED_BIT, padding
        )));
    }
    Ok(())
}

impl VectorFormat for Int8 {
    type Element = i8;

    const ELEMENT_TYPE: VectorElementType = VectorElementType::SignedInteger;
    const ELEMENT_SIZE: VectorElementSize = VectorElementSize::Bits8;

    fn payload_len(element_count: usize) -> Option<usize> {
        Some(element_count)
    }

    fn padding(_: usize) -> u8 {
        0
    }

    fn check_payload(_: &[u8], padding: u8) -> Result<()> {
        check_no_padding(padding)
    }

    fn read(payload: &[u8], index: usize) -> i8 {
        payload[index] as i8
    }

    fn write(payload: &mut [u8], index: usize, value: i8) {
        payload[index] = value as u8;
    }

    fn element_count(byte_len: usize, _: VectorHeader) -> usize {
        byte_len.saturating_sub(HEADER_SIZE)
    }
}

const F32_BYTES: usize = size_of::<f32>();

impl VectorFormat for Float32 {
    type Element = f32;

    const ELEMENT_TYPE: VectorElementType = VectorElementType::FloatingPoint;
    const ELEMENT_SIZE: VectorElementSize = VectorElementSize::Bits32;

    fn payload_len(element_count: usize) -> Option<usize> {
        element_count.checked_mul(F32_BYTES)
    }

    fn padding(_: usize) -> u8 {
        0
    }

    fn check_payload(payload: &[u8], padding: u8) -> Result<()> {
        check_no_padding(padding)?;
        if payload.len() % F32_BYTES != 0 {
            return Err(invalid(format!(
                "f32 vector values must be {} bytes, got a payload of {} bytes",
                F32_BYTES,
                payload.len()
            )));
        }
        Ok(())
    }

    fn read(payload: &[u8], index: usize) -> f32 {
        let start = index * F32_BYTES;
        let mut bytes = [0; F32_BYTES];
        bytes.copy_from_slice(&payload[start..(start + F32_BYTES)]);
        f32::from_le_bytes(bytes)
    }

    fn write(payload: &mut [u8], index: usize, value: f32) {
        let start = index * F32_BYTES;
        payload[start..(start + F32_BYTES)].copy_from_slice(&value.to_le_bytes());
    }

    fn element_count(byte_len: usize, _: VectorHeader) -> usize {
        byte_len.saturating_sub(HEADER_SIZE) / F32_BYTES
    }
}

impl VectorFormat for PackedBit {
    type Element = bool;

    const ELEMENT_TYPE: VectorElementType = VectorElementType::UnsignedInteger;
    const ELEMENT_SIZE: VectorElementSize = VectorElementSize::Bits1;

    fn payload_len(element_count: usize) -> Option<usize> {
        Some(element_count.div_ceil(8))
    }

    fn padding(element_count: usize) -> u8 {
        ((8 - element_count % 8) % 8) as u8
    }

    fn check_payload(payload: &[u8], padding: u8) -> Result<()> {
        if padding > 7 {
            return Err(invalid(format!(
                "padding must be within 0-7 inclusive, got {}",
                padding
            )));
        }
        match payload.last() {
            None if padding != 0 => Err(invalid(format!(
                "cannot specify non-zero padding if the provided vector is empty, got {}",
                padding
            ))),
            Some(last) if last & padding_mask(padding) != 0 => Err(invalid(format!(
                "the {} padding bits of the final byte must be zero, got {:#010b}",
                padding, last
            ))),
            _ => Ok(()),
        }
    }

    fn read(payload: &[u8], index: usize) -> bool {
        payload.view_bits::<Msb0>()[index]
    }

    fn write(payload: &mut [u8], index: usize, value: bool) {
        payload.view_bits_mut::<Msb0>().set(index, value);
    }

    fn element_count(byte_len: usize, header: VectorHeader) -> usize {
        (byte_len.saturating_sub(HEADER_SIZE) * 8).saturating_sub(header.padding as usize)
    }
}

/// The low `padding` bits of a byte.
fn padding_mask(padding: u8) -> u8 {
    !(0xffu8 << padding)
}

/// A read-only view of a vector stored in borrowed bytes.
pub struct VectorView<'a, F: VectorFormat> {
    header: VectorHeader,
    payload: &'a [u8],
    len: usize,
    _format: PhantomData<F>,
}

impl<'a, F: VectorFormat> VectorView<'a, F> {
    /// Validates `binary` as a vector of format `F`.
    pub fn new(binary: RawBinaryRef<'a>) -> Result<Self> {
        let header = F::validate(binary)?;
        Ok(Self::with_header(binary.bytes, header))
    }

    /// Validates the bytes of a binary value, header included, as a vector of format `F`.
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        let header = F::validate_bytes(bytes)?;
        Ok(Self::with_header(bytes, header))
    }

    /// `bytes` must already have been validated as format `F` with `header`.
    fn with_header(bytes: &'a [u8], header: VectorHeader) -> Self {
        Self {
            header,
            payload: &bytes[HEADER_SIZE..],
            len: F::element_count(bytes.len(), header),
            _format: PhantomData,
        }
    }

    pub fn header(&self) -> VectorHeader {
        self.header
    }

    /// The number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The element at `index`, or `None` if it is out of range.
    pub fn get(&self, index: usize) -> Option<F::Element> {
        (index < self.len).then(|| F::read(self.payload, index))
    }

    pub fn iter(&self) -> impl Iterator<Item = F::Element> + use<'a, F> {
        let payload = self.payload;
        (0..self.len).map(move |i| F::read(payload, i))
    }

    /// The payload bytes after the header. For packed bits, the padding bits of the final byte
    /// are visible here and always zero.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.payload
    }
}

impl<F: VectorFormat> Clone for VectorView<'_, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F: VectorFormat> Copy for VectorView<'_, F> {}

impl<F: VectorFormat> fmt::Debug for VectorView<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorView")
            .field("header", &self.header)
            .field("elements", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl<F: VectorFormat> PartialEq for VectorView<'_, F> {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header && self.payload == other.payload
    }
}

/// A mutable view of a vector stored in borrowed bytes, such as the space reserved by
/// [`Builder::append_vector`](crate::builder::Builder::append_vector).
pub struct VectorViewMut<'a, F: VectorFormat> {
    header: VectorHeader,
    payload: &'a mut [u8],
    len: usize,
    _format: PhantomData<F>,
}

impl<'a, F: VectorFormat> VectorViewMut<'a, F> {
    /// Validates the bytes of a binary value, header included, as a vector of format `F`.
    pub fn from_bytes(bytes: &'a mut [u8]) -> Result<Self> {
        let header = F::validate_bytes(bytes)?;
        let len = F::element_count(bytes.len(), header);
        Ok(Self {
            header,
            payload: &mut bytes[HEADER_SIZE..],
            len,
            _format: PhantomData,
        })
    }

    /// Writes a fresh header for `element_count` elements into `bytes` and views the result.
    pub fn from_frame(bytes: &'a mut [u8], element_count: usize) -> Result<Self> {
        let header = F::write_frame(bytes, element_count)?;
        Ok(Self {
            header,
            payload: &mut bytes[HEADER_SIZE..],
            len: element_count,
            _format: PhantomData,
        })
    }

    pub fn header(&self) -> VectorHeader {
        self.header
    }

    /// The number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The element at `index`, or `None` if it is out of range.
    pub fn get(&self, index: usize) -> Option<F::Element> {
        (index < self.len).then(|| F::read(self.payload, index))
    }

    /// Overwrites the element at `index`.
    pub fn set(&mut self, index: usize, value: F::Element) -> Result<()> {
        if index >= self.len {
            return Err(Error::vector(format!(
                "index {} out of range for a vector of {} elements",
                index, self.len
            )));
        }
        F::write(self.payload, index, value);
        Ok(())
    }

    /// The payload bytes after the header.
    pub fn as_bytes(&self) -> &[u8] {
        &*self.payload
    }

    pub fn as_view(&self) -> VectorView<'_, F> {
        VectorView {
            header: self.header,
            payload: &*self.payload,
            len: self.len,
            _format: PhantomData,
        }
    }
}

impl VectorViewMut<'_, PackedBit> {
    /// Overwrites eight elements at once. Bits of the final byte that fall in the padding are
    /// cleared.
    ///
    /// ```rust
    /// use rawbson::binary::vector::{PackedBit, VectorFormat, VectorViewMut};
    ///
    /// let mut bytes = vec![0; PackedBit::length_for_append(9)? as usize];
    /// let mut view = VectorViewMut::<PackedBit>::from_frame(&mut bytes, 9)?;
    /// view.set_byte(0, 0xff)?;
    /// view.set_byte(1, 0xff)?;
    /// assert_eq!(view.as_bytes(), [0xff, 0x80]);
    /// # Ok::<(), rawbson::error::Error>(())
    /// ```
    pub fn set_byte(&mut self, index: usize, byte: u8) -> Result<()> {
        let last = self.payload.len().checked_sub(1);
        match self.payload.get_mut(index) {
            Some(slot) if Some(index) == last => {
                *slot = byte & !padding_mask(self.header.padding);
            }
            Some(slot) => *slot = byte,
            None => {
                return Err(Error::vector(format!(
                    "byte {} out of range for a vector of {} bytes",
                    index, self.payload.len()
                )));
            }
        }
        Ok(())
    }
}

impl<F: VectorFormat> fmt::Debug for VectorViewMut<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.as_view(), f)
    }
}

/// A vector of numeric values. This type can be converted into a [`Binary`] of subtype
/// [`BinarySubtype::Vector`].
///
/// ```rust
/// # use rawbson::binary::{Binary, Vector};
/// let vector = Vector::Int8(vec![0, 1, 2]);
/// let binary = Binary::from(&vector);
/// assert_eq!(Vector::try_from(&binary)?, vector);
/// # Ok::<(), rawbson::error::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Vector {
    /// A vector of `i8` values.
    Int8(Vec<i8>),

    /// A vector of `f32` values.
    Float32(Vec<f32>),

    /// A vector of packed bits. See [`PackedBitVector::new`] for more details.
    PackedBit(PackedBitVector),
}

/// A vector of packed bits. This type can be constructed by calling [`PackedBitVector::new`] or
/// [`PackedBitVector::from_bits`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PackedBitVector {
    vector: Vec<u8>,
    padding: u8,
}

impl PackedBitVector {
    /// Construct a new `PackedBitVector`. Each `u8` value in the provided `vector` represents 8
    /// single-bit elements, most significant bit first. For example, the following vector:
    ///
    /// ```rust
    /// # use rawbson::binary::PackedBitVector;
    /// let packed_bits = vec![238, 224];
    /// let vector = PackedBitVector::new(packed_bits, 0)?;
    /// # Ok::<(), rawbson::error::Error>(())
    /// ```
    ///
    /// represents a 16-bit vector containing the following values:
    ///
    /// ```text
    /// [1, 1, 1, 0, 1, 1, 1, 0, 1, 1, 1, 0, 0, 0, 0, 0]
    /// ```
    ///
    /// Padding can optionally be specified to ignore a number of least-significant bits in the
    /// final byte. For example, the vector in the previous example with a padding of 4 would
    /// represent a 12-bit vector containing the following values:
    ///
    /// ```text
    /// [1, 1, 1, 0, 1, 1, 1, 0, 1, 1, 1, 0]
    /// ```
    ///
    /// Padding must be within 0-7 inclusive. Padding must be 0 or unspecified if the provided
    /// vector is empty. The ignored bits must be zero.
    pub fn new(vector: Vec<u8>, padding: impl Into<Option<u8>>) -> Result<Self> {
        let padding = padding.into().unwrap_or(0);
        PackedBit::check_payload(&vector, padding)?;
        Ok(Self { vector, padding })
    }

    /// Packs a sequence of bits.
    ///
    /// ```rust
    /// # use rawbson::binary::PackedBitVector;
    /// let vector = PackedBitVector::from_bits([true; 5]);
    /// assert_eq!(vector.as_bytes(), [0b1111_1000]);
    /// assert_eq!(vector.padding(), 3);
    /// ```
    pub fn from_bits(bits: impl IntoIterator<Item = bool>) -> Self {
        let mut vector = Vec::new();
        let mut count = 0;
        for bit in bits {
            if count % 8 == 0 {
                vector.push(0);
            }
            PackedBit::write(&mut vector, count, bit);
            count += 1;
        }
        Self {
            vector,
            padding: PackedBit::padding(count),
        }
    }

    /// The number of bits.
    pub fn len(&self) -> usize {
        self.vector.len() * 8 - self.padding as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        (index < self.len()).then(|| PackedBit::read(&self.vector, index))
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len()).map(|i| PackedBit::read(&self.vector, i))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.vector
    }

    pub fn padding(&self) -> u8 {
        self.padding
    }
}

impl Vector {
    /// Construct a [`Vector`] from the given bytes. See the
    /// [specification](https://github.com/mongodb/specifications/blob/master/source/bson-binary-vector/bson-binary-vector.md#specification)
    /// for details on the expected byte format.
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Result<Self> {
        let bytes = bytes.as_ref();

        if bytes.len() < HEADER_SIZE {
            return Err(invalid(format!(
                "the provided bytes must have a length of at least {}, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        match bytes[0] {
            INT8 => {
                let view = VectorView::<Int8>::from_bytes(bytes)?;
                Ok(Self::Int8(view.iter().collect()))
            }
            FLOAT32 => {
                let view = VectorView::<Float32>::from_bytes(bytes)?;
                Ok(Self::Float32(view.iter().collect()))
            }
            PACKED_BIT => {
                let view = VectorView::<PackedBit>::from_bytes(bytes)?;
                Ok(Self::PackedBit(PackedBitVector {
                    vector: view.as_bytes().to_vec(),
                    padding: view.header().padding,
                }))
            }
            other => Err(invalid(format!("unsupported vector data type: {:#04x}", other))),
        }
    }

    /// The header this vector is encoded with.
    pub fn header(&self) -> VectorHeader {
        match self {
            Self::Int8(v) => Int8::header(v.len()),
            Self::Float32(v) => Float32::header(v.len()),
            Self::PackedBit(v) => VectorHeader {
                padding: v.padding,
                ..PackedBit::header(0)
            },
        }
    }

    /// The number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Int8(v) => v.len(),
            Self::Float32(v) => v.len(),
            Self::PackedBit(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&Vector> for Binary {
    fn from(vector: &Vector) -> Self {
        let mut bytes = vector.header().to_bytes().to_vec();

        match vector {
            Vector::Int8(vector) => {
                for n in vector {
                    bytes.extend_from_slice(&n.to_le_bytes());
                }
            }
            Vector::Float32(vector) => {
                for n in vector {
                    bytes.extend_from_slice(&n.to_le_bytes());
                }
            }
            Vector::PackedBit(PackedBitVector { vector, .. }) => {
                bytes.extend_from_slice(vector);
            }
        }

        Self {
            subtype: BinarySubtype::Vector,
            bytes,
        }
    }
}

impl From<Vector> for Binary {
    fn from(vector: Vector) -> Binary {
        Self::from(&vector)
    }
}

impl TryFrom<RawBinaryRef<'_>> for Vector {
    type Error = Error;

    fn try_from(binary: RawBinaryRef<'_>) -> Result<Self> {
        if binary.subtype != BinarySubtype::Vector {
            return Err(invalid(format!(
                "expected vector binary subtype, got {:?}",
                binary.subtype
            )));
        }
        Self::from_bytes(binary.bytes)
    }
}

impl TryFrom<&Binary> for Vector {
    type Error = Error;

    fn try_from(binary: &Binary) -> Result<Self> {
        Self::try_from(binary.as_raw_binary())
    }
}

impl TryFrom<Binary> for Vector {
    type Error = Error;

    fn try_from(binary: Binary) -> Result<Self> {
        Self::try_from(&binary)
    }
}

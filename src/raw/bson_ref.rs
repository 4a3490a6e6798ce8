use std::fmt;

use super::{RawArray, RawArrayBuf, RawDocument, RawDocumentBuf};
use crate::{
    binary::Binary,
    oid::ObjectId,
    spec::{BinarySubtype, ElementType},
};

/// A BSON value referencing raw bytes stored elsewhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawBsonRef<'a> {
    /// 64-bit binary floating point
    Double(f64),
    /// UTF-8 string
    String(&'a str),
    /// Array
    Array(&'a RawArray),
    /// Embedded document
    Document(&'a RawDocument),
    /// Boolean value
    Boolean(bool),
    /// Null value
    Null,
    /// Regular expression
    RegularExpression(RawRegexRef<'a>),
    /// JavaScript code
    JavaScriptCode(&'a str),
    /// JavaScript code w/ scope
    JavaScriptCodeWithScope(RawJavaScriptCodeWithScopeRef<'a>),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// Timestamp
    Timestamp(Timestamp),
    /// Binary data
    Binary(RawBinaryRef<'a>),
    /// [ObjectId](http://dochub.mongodb.org/core/objectids)
    ObjectId(ObjectId),
    /// UTC datetime, in milliseconds since the Unix epoch
    DateTime(i64),
    /// Symbol (Deprecated)
    Symbol(&'a str),
    /// [128-bit decimal floating point](https://github.com/mongodb/specifications/blob/master/source/bson-decimal128/decimal128.rst)
    Decimal128(Decimal128),
    /// Undefined value (Deprecated)
    Undefined,
    /// Max key
    MaxKey,
    /// Min key
    MinKey,
    /// DBPointer (Deprecated)
    DbPointer(RawDbPointerRef<'a>),
}

impl<'a> RawBsonRef<'a> {
    /// Get the [`ElementType`] of this value.
    pub fn element_type(&self) -> ElementType {
        match *self {
            RawBsonRef::Double(..) => ElementType::Double,
            RawBsonRef::String(..) => ElementType::String,
            RawBsonRef::Array(..) => ElementType::Array,
            RawBsonRef::Document(..) => ElementType::EmbeddedDocument,
            RawBsonRef::Boolean(..) => ElementType::Boolean,
            RawBsonRef::Null => ElementType::Null,
            RawBsonRef::RegularExpression(..) => ElementType::RegularExpression,
            RawBsonRef::JavaScriptCode(..) => ElementType::JavaScriptCode,
            RawBsonRef::JavaScriptCodeWithScope(..) => ElementType::JavaScriptCodeWithScope,
            RawBsonRef::Int32(..) => ElementType::Int32,
            RawBsonRef::Int64(..) => ElementType::Int64,
            RawBsonRef::Timestamp(..) => ElementType::Timestamp,
            RawBsonRef::Binary(..) => ElementType::Binary,
            RawBsonRef::ObjectId(..) => ElementType::ObjectId,
            RawBsonRef::DateTime(..) => ElementType::DateTime,
            RawBsonRef::Symbol(..) => ElementType::Symbol,
            RawBsonRef::Decimal128(..) => ElementType::Decimal128,
            RawBsonRef::Undefined => ElementType::Undefined,
            RawBsonRef::MaxKey => ElementType::MaxKey,
            RawBsonRef::MinKey => ElementType::MinKey,
            RawBsonRef::DbPointer(..) => ElementType::DbPointer,
        }
    }

    /// Gets the `f64` that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// double.
    pub fn as_f64(self) -> Option<f64> {
        match self {
            RawBsonRef::Double(d) => Some(d),
            _ => None,
        }
    }

    /// Gets the `&str` that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// String.
    pub fn as_str(self) -> Option<&'a str> {
        match self {
            RawBsonRef::String(s) => Some(s),
            _ => None,
        }
    }

    /// Gets the [`RawArray`] that's referenced or returns [`None`] if the referenced value
    /// isn't a BSON array.
    pub fn as_array(self) -> Option<&'a RawArray> {
        match self {
            RawBsonRef::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`RawDocument`] that's referenced or returns [`None`] if the referenced value
    /// isn't a BSON document.
    pub fn as_document(self) -> Option<&'a RawDocument> {
        match self {
            RawBsonRef::Document(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the `bool` that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// boolean.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            RawBsonRef::Boolean(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the `i32` that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// Int32.
    pub fn as_i32(self) -> Option<i32> {
        match self {
            RawBsonRef::Int32(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the `i64` that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// Int64.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            RawBsonRef::Int64(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`ObjectId`] that's referenced or returns [`None`] if the referenced value isn't
    /// a BSON ObjectID.
    pub fn as_object_id(self) -> Option<ObjectId> {
        match self {
            RawBsonRef::ObjectId(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`RawBinaryRef`] that's referenced or returns [`None`] if the referenced value
    /// isn't a BSON binary.
    pub fn as_binary(self) -> Option<RawBinaryRef<'a>> {
        match self {
            RawBsonRef::Binary(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`RawRegexRef`] that's referenced or returns [`None`] if the referenced value
    /// isn't a BSON regular expression.
    pub fn as_regex(self) -> Option<RawRegexRef<'a>> {
        match self {
            RawBsonRef::RegularExpression(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the datetime, in milliseconds since the Unix epoch, or returns [`None`] if the
    /// referenced value isn't a BSON datetime.
    pub fn as_datetime(self) -> Option<i64> {
        match self {
            RawBsonRef::DateTime(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the symbol that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// symbol.
    pub fn as_symbol(self) -> Option<&'a str> {
        match self {
            RawBsonRef::Symbol(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`Timestamp`] that's referenced or returns [`None`] if the referenced value isn't
    /// a BSON timestamp.
    pub fn as_timestamp(self) -> Option<Timestamp> {
        match self {
            RawBsonRef::Timestamp(timestamp) => Some(timestamp),
            _ => None,
        }
    }

    /// Gets the null value that's referenced or returns [`None`] if the referenced value isn't a
    /// BSON null.
    pub fn as_null(self) -> Option<()> {
        match self {
            RawBsonRef::Null => Some(()),
            _ => None,
        }
    }

    pub fn as_db_pointer(self) -> Option<RawDbPointerRef<'a>> {
        match self {
            RawBsonRef::DbPointer(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_javascript(self) -> Option<&'a str> {
        match self {
            RawBsonRef::JavaScriptCode(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_javascript_with_scope(self) -> Option<RawJavaScriptCodeWithScopeRef<'a>> {
        match self {
            RawBsonRef::JavaScriptCodeWithScope(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_decimal128(self) -> Option<Decimal128> {
        match self {
            RawBsonRef::Decimal128(d) => Some(d),
            _ => None,
        }
    }
}

impl From<i32> for RawBsonRef<'_> {
    fn from(i: i32) -> Self {
        RawBsonRef::Int32(i)
    }
}

impl From<i64> for RawBsonRef<'_> {
    fn from(i: i64) -> Self {
        RawBsonRef::Int64(i)
    }
}

impl From<f64> for RawBsonRef<'_> {
    fn from(f: f64) -> Self {
        RawBsonRef::Double(f)
    }
}

impl From<bool> for RawBsonRef<'_> {
    fn from(b: bool) -> Self {
        RawBsonRef::Boolean(b)
    }
}

impl<'a> From<&'a str> for RawBsonRef<'a> {
    fn from(s: &'a str) -> Self {
        RawBsonRef::String(s)
    }
}

impl<'a> From<&'a String> for RawBsonRef<'a> {
    fn from(s: &'a String) -> Self {
        RawBsonRef::String(s.as_str())
    }
}

impl<'a> From<&'a RawDocument> for RawBsonRef<'a> {
    fn from(d: &'a RawDocument) -> Self {
        RawBsonRef::Document(d)
    }
}

impl<'a> From<&'a RawDocumentBuf> for RawBsonRef<'a> {
    fn from(d: &'a RawDocumentBuf) -> Self {
        RawBsonRef::Document(&**d)
    }
}

impl<'a> From<&'a RawArray> for RawBsonRef<'a> {
    fn from(a: &'a RawArray) -> Self {
        RawBsonRef::Array(a)
    }
}

impl<'a> From<&'a RawArrayBuf> for RawBsonRef<'a> {
    fn from(a: &'a RawArrayBuf) -> Self {
        RawBsonRef::Array(&**a)
    }
}

impl<'a> From<RawBinaryRef<'a>> for RawBsonRef<'a> {
    fn from(b: RawBinaryRef<'a>) -> Self {
        RawBsonRef::Binary(b)
    }
}

impl<'a> From<&'a Binary> for RawBsonRef<'a> {
    fn from(b: &'a Binary) -> Self {
        RawBsonRef::Binary(b.as_raw_binary())
    }
}

impl<'a> From<RawRegexRef<'a>> for RawBsonRef<'a> {
    fn from(re: RawRegexRef<'a>) -> Self {
        RawBsonRef::RegularExpression(re)
    }
}

impl<'a> From<RawJavaScriptCodeWithScopeRef<'a>> for RawBsonRef<'a> {
    fn from(code: RawJavaScriptCodeWithScopeRef<'a>) -> Self {
        RawBsonRef::JavaScriptCodeWithScope(code)
    }
}

impl<'a> From<RawDbPointerRef<'a>> for RawBsonRef<'a> {
    fn from(p: RawDbPointerRef<'a>) -> Self {
        RawBsonRef::DbPointer(p)
    }
}

impl From<ObjectId> for RawBsonRef<'_> {
    fn from(oid: ObjectId) -> Self {
        RawBsonRef::ObjectId(oid)
    }
}

impl From<Timestamp> for RawBsonRef<'_> {
    fn from(ts: Timestamp) -> Self {
        RawBsonRef::Timestamp(ts)
    }
}

impl From<Decimal128> for RawBsonRef<'_> {
    fn from(d: Decimal128) -> Self {
        RawBsonRef::Decimal128(d)
    }
}

/// A BSON binary value referencing raw bytes stored elsewhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawBinaryRef<'a> {
    /// The subtype of the binary value.
    pub subtype: BinarySubtype,

    /// The binary bytes.
    pub bytes: &'a [u8],
}

impl RawBinaryRef<'_> {
    /// The number of bytes this value's payload occupies on the wire. Values of the old binary
    /// subtype carry a second length prefix inside the payload.
    pub(crate) fn len(&self) -> usize {
        match self.subtype {
            BinarySubtype::BinaryOld => self.bytes.len() + 4,
            _ => self.bytes.len(),
        }
    }
}

/// A BSON regex referencing raw bytes stored elsewhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawRegexRef<'a> {
    /// The regex pattern to match.
    pub pattern: &'a str,

    /// The options for the regex.
    ///
    /// Options are identified by characters, which must be stored in
    /// alphabetical order. Valid options are 'i' for case insensitive matching, 'm' for
    /// multiline matching, 'x' for verbose mode, 'l' to make \w, \W, etc. locale dependent,
    /// 's' for dotall mode ('.' matches everything), and 'u' to make \w, \W, etc. match
    /// unicode.
    pub options: &'a str,
}

/// A BSON "code with scope" value referencing raw bytes stored elsewhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawJavaScriptCodeWithScopeRef<'a> {
    /// The JavaScript code.
    pub code: &'a str,

    /// The scope document containing variable bindings.
    pub scope: &'a RawDocument,
}

impl RawJavaScriptCodeWithScopeRef<'_> {
    /// The number of bytes this value occupies on the wire, including its own length prefix.
    pub(crate) fn len(self) -> usize {
        4 + 4 + self.code.len() + 1 + self.scope.as_bytes().len()
    }
}

/// A BSON DB pointer value referencing raw bytes stored elsewhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawDbPointerRef<'a> {
    pub namespace: &'a str,
    pub id: ObjectId,
}

/// Represents a BSON timestamp value.
#[derive(Debug, Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash)]
pub struct Timestamp {
    /// The number of seconds since the Unix epoch.
    pub time: u32,

    /// An incrementing value to order timestamps with the same number of seconds in the `time`
    /// field.
    pub increment: u32,
}

impl Timestamp {
    pub(crate) fn to_le_bytes(self) -> [u8; 8] {
        let mut out = [0; 8];
        out[0..4].copy_from_slice(&self.increment.to_le_bytes());
        out[4..8].copy_from_slice(&self.time.to_le_bytes());
        out
    }

    pub(crate) fn from_le_bytes(bytes: [u8; 8]) -> Self {
        let mut increment = [0; 4];
        increment.copy_from_slice(&bytes[0..4]);
        let mut time = [0; 4];
        time.copy_from_slice(&bytes[4..8]);
        Timestamp {
            time: u32::from_le_bytes(time),
            increment: u32::from_le_bytes(increment),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Timestamp({}, {})", self.time, self.increment)
    }
}

/// Struct representing a BSON Decimal128 type.
///
/// This type only stores the 16 encoded bytes; arithmetic is out of scope. The [`Display`]
/// implementation renders the value using the string conversion of the decimal128 specification.
///
/// [`Display`]: std::fmt::Display
#[derive(Copy, Clone, Hash, PartialEq, Eq)]
pub struct Decimal128 {
    /// BSON bytes containing the decimal128. Stored for round tripping.
    pub(crate) bytes: [u8; 16],
}

const DECIMAL128_EXPONENT_BIAS: i32 = 6176;
const DECIMAL128_MAX_COEFFICIENT: u128 = 9_999_999_999_999_999_999_999_999_999_999;

impl Decimal128 {
    /// Constructs a new `Decimal128` from the provided raw byte representation.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self { bytes }
    }

    /// Returns the raw byte representation of this `Decimal128`.
    pub fn bytes(&self) -> [u8; 16] {
        self.bytes
    }
}

impl fmt::Debug for Decimal128 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Decimal128({})", hex::encode(self.bytes))
    }
}

impl fmt::Display for Decimal128 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let bits = u128::from_le_bytes(self.bytes);
        let negative = bits >> 127 == 1;
        let sign = if negative { "-" } else { "" };

        let (biased_exponent, coefficient) = if (bits >> 125) & 0b11 == 0b11 {
            match (bits >> 122) & 0b11111 {
                0b11111 => return f.write_str("NaN"),
                0b11110 => return write!(f, "{}Infinity", sign),
                _ => {
                    // the implied coefficient is always larger than the maximum, so the value
                    // is a non-canonical zero
                    (((bits >> 111) & 0x3fff) as i32, 0)
                }
            }
        } else {
            (((bits >> 113) & 0x3fff) as i32, bits & ((1 << 113) - 1))
        };

        let coefficient = if coefficient > DECIMAL128_MAX_COEFFICIENT {
            0
        } else {
            coefficient
        };
        let exponent = biased_exponent - DECIMAL128_EXPONENT_BIAS;
        let digits = coefficient.to_string();
        let adjusted_exponent = exponent + (digits.len() as i32 - 1);

        f.write_str(sign)?;
        if exponent <= 0 && adjusted_exponent >= -6 {
            if exponent == 0 {
                return f.write_str(&digits);
            }
            let point = digits.len() as i32 + exponent;
            if point > 0 {
                let (whole, fraction) = digits.split_at(point as usize);
                write!(f, "{}.{}", whole, fraction)
            } else {
                write!(f, "0.{}{}", "0".repeat((-point) as usize), digits)
            }
        } else {
            let (first, rest) = digits.split_at(1);
            f.write_str(first)?;
            if !rest.is_empty() {
                write!(f, ".{}", rest)?;
            }
            write!(f, "E{:+}", adjusted_exponent)
        }
    }
}

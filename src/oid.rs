//! ObjectId

use std::{fmt, str::FromStr};

use crate::error::{Error, Result};

const TIMESTAMP_SIZE: usize = 4;
const TIMESTAMP_OFFSET: usize = 0;

/// A wrapper around a raw 12-byte ObjectId.
///
/// This crate only reads and writes ObjectIds; generating new ones is left to the caller.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    id: [u8; 12],
}

impl ObjectId {
    /// Constructs a new ObjectId wrapper around the raw byte representation.
    pub const fn from_bytes(bytes: [u8; 12]) -> ObjectId {
        ObjectId { id: bytes }
    }

    /// Creates an ObjectId from a 24-character hexadecimal string.
    pub fn parse_str(s: impl AsRef<str>) -> Result<ObjectId> {
        let s = s.as_ref();

        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| {
            Error::malformed_bytes(format!("invalid ObjectId hex string {:?}: {}", s, e))
        })?;
        Ok(ObjectId::from_bytes(bytes))
    }

    /// Retrieves the timestamp (seconds since epoch) stored in the leading bytes.
    pub fn timestamp_secs(&self) -> u32 {
        let mut buf = [0; TIMESTAMP_SIZE];
        buf.copy_from_slice(&self.id[TIMESTAMP_OFFSET..(TIMESTAMP_OFFSET + TIMESTAMP_SIZE)]);
        u32::from_be_bytes(buf)
    }

    /// Returns the raw byte representation of an ObjectId.
    pub const fn bytes(&self) -> [u8; 12] {
        self.id
    }

    /// Convert this [`ObjectId`] to its hex string representation.
    pub fn to_hex(self) -> String {
        hex::encode(self.id)
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_str(s)
    }
}

impl From<[u8; 12]> for ObjectId {
    fn from(bytes: [u8; 12]) -> Self {
        Self { id: bytes }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("ObjectId").field(&self.to_hex()).finish()
    }
}

#[cfg(test)]
mod test {
    use super::ObjectId;

    #[test]
    fn hex_round_trip() {
        let s = "507f1f77bcf86cd799439011";
        let oid: ObjectId = s.parse().unwrap();
        assert_eq!(oid.to_hex(), s);
        assert_eq!(oid.timestamp_secs(), 0x507f1f77);
    }

    #[test]
    fn rejects_bad_hex() {
        assert!(ObjectId::parse_str("507f1f77bcf86cd79943901").is_err());
        assert!(ObjectId::parse_str("zz7f1f77bcf86cd799439011").is_err());
    }
}

//! Commit identification.

use crate::error::{LxqError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 20-byte git object id naming a commit.
///
/// Serialized as its 40-character lowercase hex form.
///
/// # Examples
///
/// ```
/// use lxq_core::CommitHash;
///
/// let hash = CommitHash::from_bytes([0xab; 20]);
/// assert_eq!(hash.as_hex().len(), 40);
/// assert_eq!(hash.short(), "abababababab");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommitHash([u8; 20]);

impl CommitHash {
    /// The length of a CommitHash in bytes.
    pub const LEN: usize = 20;

    /// The length of a CommitHash as a hex string.
    pub const HEX_LEN: usize = 40;

    /// Creates a CommitHash from raw bytes.
    #[inline]
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Returns the raw hash bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns this hash as a lowercase hex string of exactly 40 characters.
    pub fn as_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns the conventional 12-character abbreviation.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..6])
    }

    /// Parses a CommitHash from a full 40-character hex string.
    ///
    /// # Errors
    ///
    /// Returns `LxqError::InvalidHex` if the string is not valid hex
    /// or is not exactly 40 characters long.
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() != Self::HEX_LEN {
            return Err(LxqError::InvalidHex(format!(
                "expected {} hex chars, got {}",
                Self::HEX_LEN,
                s.len()
            )));
        }

        let bytes = hex::decode(s).map_err(|e| LxqError::InvalidHex(e.to_string()))?;

        let arr: [u8; 20] = bytes
            .try_into()
            .map_err(|_| LxqError::InvalidHex("invalid length".to_string()))?;

        Ok(Self(arr))
    }

    pub(crate) fn from_oid(oid: git2::Oid) -> Self {
        let mut arr = [0u8; 20];
        arr.copy_from_slice(oid.as_bytes());
        Self(arr)
    }

    pub(crate) fn to_oid(self) -> git2::Oid {
        // 20 bytes is always a valid SHA-1 oid
        git2::Oid::from_bytes(&self.0).unwrap_or_else(|_| git2::Oid::zero())
    }
}

impl FromStr for CommitHash {
    type Err = LxqError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

impl fmt::Debug for CommitHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitHash({})", self.short())
    }
}

impl Serialize for CommitHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for CommitHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

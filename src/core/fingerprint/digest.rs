//! The 16-byte MD5 fingerprint value.

use crate::error::FileKitError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Length of an MD5 digest in bytes
pub const DIGEST_LEN: usize = 16;

/// An MD5 digest of (part of) a file's contents.
///
/// Serializes as 32 lowercase hex characters, the form the media
/// database stores.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Wrap raw digest bytes
    pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lowercase hex rendering
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl From<[u8; DIGEST_LEN]> for Digest {
    fn from(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = FileKitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || FileKitError::InvalidArgument(format!("not an MD5 hex digest: {:?}", s));

        if s.len() != DIGEST_LEN * 2 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let mut bytes = [0u8; DIGEST_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
        }
        Ok(Self(bytes))
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_MD5: &str = "d41d8cd98f00b204e9800998ecf8427e";

    #[test]
    fn to_hex_produces_lowercase_string() {
        let digest = Digest::from_bytes([
            0xDE, 0xAD, 0xBE, 0xEF, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01,
        ]);
        assert_eq!(digest.to_hex(), "deadbeef000000000000000000000001");
    }

    #[test]
    fn parses_hex() {
        let digest: Digest = EMPTY_MD5.parse().unwrap();
        assert_eq!(digest.to_string(), EMPTY_MD5);
        assert_eq!(digest.as_bytes()[0], 0xd4);
    }

    #[test]
    fn parse_accepts_uppercase() {
        let digest: Digest = EMPTY_MD5.to_uppercase().parse().unwrap();
        assert_eq!(digest.to_hex(), EMPTY_MD5);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!("d41d8cd9".parse::<Digest>().is_err());
        assert!("zz1d8cd98f00b204e9800998ecf8427e".parse::<Digest>().is_err());
        assert!("é41d8cd98f00b204e9800998ecf8427".parse::<Digest>().is_err());
    }

    #[test]
    fn parse_rejects_signed_pairs() {
        assert!("+0+0+0+0+0+0+0+0+0+0+0+0+0+0+0+0".parse::<Digest>().is_err());
        assert!("+d1d8cd98f00b204e9800998ecf8427e".parse::<Digest>().is_err());
        assert!("D41D8CD98F00B204E9800998ECF8427E".parse::<Digest>().is_ok());
    }

    #[test]
    fn serializes_as_hex_string() {
        let digest: Digest = EMPTY_MD5.parse().unwrap();
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"{}\"", EMPTY_MD5));

        let back: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, digest);
    }
}

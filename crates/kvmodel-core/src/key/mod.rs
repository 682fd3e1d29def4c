mod ordered;

#[cfg(test)]
mod tests;

pub use ordered::KeyDecodeError;

use derive_more::From;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// KeyPart
///
/// One component of a tuple key.
/// Variant order is the cross-type sort order of encoded keys (do not reorder).
///

#[derive(Clone, Debug, Deserialize, Eq, From, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum KeyPart {
    Bytes(Vec<u8>),
    Text(String),
    Int(i64),
    Uint(u64),
    Bool(bool),
}

impl KeyPart {
    /// Borrow the text payload, if this is a text part.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bytes(_) => "bytes",
            Self::Text(_) => "text",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Bool(_) => "bool",
        }
    }
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<&String> for KeyPart {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i32> for KeyPart {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for KeyPart {
    fn from(value: u32) -> Self {
        Self::Uint(u64::from(value))
    }
}

impl From<&[u8]> for KeyPart {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => {
                f.write_str("0x")?;
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Self::Text(text) => write!(f, "{text:?}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}u"),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

///
/// Key
///
/// Ordered tuple key. Encoded byte order equals tuple order, and the encoding
/// of a tuple prefix is a byte prefix of the full key's encoding.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Key(Vec<KeyPart>);

impl Key {
    #[must_use]
    pub const fn new(parts: Vec<KeyPart>) -> Self {
        Self(parts)
    }

    #[must_use]
    pub fn with(mut self, part: impl Into<KeyPart>) -> Self {
        self.0.push(part.into());
        self
    }

    #[must_use]
    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    #[must_use]
    pub fn into_parts(self) -> Vec<KeyPart> {
        self.0
    }

    #[must_use]
    pub fn last(&self) -> Option<&KeyPart> {
        self.0.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether every part of `prefix` matches the leading parts of this key.
    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Canonical order-preserving byte encoding.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for part in &self.0 {
            ordered::encode_part(&mut out, part);
        }

        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyDecodeError> {
        ordered::decode_parts(bytes).map(Self)
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{part}")?;
        }
        f.write_str("]")
    }
}

impl<P: Into<KeyPart>> FromIterator<P> for Key {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

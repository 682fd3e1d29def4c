use derive_more::Display;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use ulid::{Generator, Ulid};

///
/// GENERATOR is lazily initiated with a Mutex
/// it has to keep state so ids minted in the same millisecond stay ordered
///

static GENERATOR: LazyLock<Mutex<Generator>> = LazyLock::new(|| Mutex::new(Generator::new()));

///
/// RecordId
///
/// Opaque, system-assigned record identifier.
/// Minted once at creation as a ULID string and never reused or mutated.
///

#[derive(
    Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Length of a generated id (Crockford base32 ULID).
    pub const GENERATED_LEN: usize = 26;

    /// Mint a fresh identifier.
    ///
    /// Monotonic within a millisecond; on generator overflow a fully random
    /// ULID is used instead, which is still unique but not ordered.
    #[must_use]
    pub fn generate() -> Self {
        let ulid = GENERATOR.lock().generate().unwrap_or_else(|_| Ulid::new());

        Self(ulid.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique_and_ordered() {
        let a = RecordId::generate();
        let b = RecordId::generate();

        assert_ne!(a, b);
        assert!(a < b);
        assert_eq!(a.as_str().len(), RecordId::GENERATED_LEN);
    }

    #[test]
    fn record_id_serializes_as_plain_text() {
        let id = RecordId::from("01HZY3V6Q9J6W0X6T5N2B7C8D9");
        let bytes = serde_cbor::to_vec(&id).unwrap();
        let text: String = serde_cbor::from_slice(&bytes).unwrap();

        assert_eq!(text, id.as_str());
    }
}

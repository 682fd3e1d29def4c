//! Keyspace layout.
//!
//! Primary entries live under `[collection, id]`. Each indexed field owns a
//! sibling keyspace named `{collection}_by_{field}` holding `[name, value]`
//! pointers. Because key parts are terminated before encoding, the
//! collection prefix never covers an index keyspace.

use crate::{
    key::{Key, KeyPart},
    types::RecordId,
};

/// Separator between a collection name and an indexed field name.
pub const INDEX_SEPARATOR: &str = "_by_";

/// Prefix covering every primary entry of `collection`.
#[must_use]
pub fn collection_prefix(collection: &str) -> Key {
    Key::new(vec![KeyPart::from(collection)])
}

/// Primary key of one record.
#[must_use]
pub fn primary_key(collection: &str, id: &RecordId) -> Key {
    collection_prefix(collection).with(id.as_str())
}

/// Name of the index keyspace for `field`.
#[must_use]
pub fn index_keyspace(collection: &str, field: &str) -> String {
    format!("{collection}{INDEX_SEPARATOR}{field}")
}

/// Prefix covering every entry of one index keyspace.
#[must_use]
pub fn index_prefix(collection: &str, field: &str) -> Key {
    Key::new(vec![KeyPart::Text(index_keyspace(collection, field))])
}

/// Index entry key for `field = value`.
#[must_use]
pub fn index_key(collection: &str, field: &str, value: KeyPart) -> Key {
    index_prefix(collection, field).with(value)
}

/// Record id carried by a primary key, if the key has the primary shape.
#[must_use]
pub fn id_from_primary_key(key: &Key) -> Option<RecordId> {
    match key.parts() {
        [KeyPart::Text(_), KeyPart::Text(id)] => Some(RecordId::from(id.as_str())),
        _ => None,
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_key_uses_by_keyspace() {
        let key = index_key("users", "email", KeyPart::from("a@x"));

        assert_eq!(
            key.parts(),
            &[KeyPart::from("users_by_email"), KeyPart::from("a@x")]
        );
    }

    #[test]
    fn primary_key_round_trips_id() {
        let id = RecordId::from("01HZX");
        let key = primary_key("users", &id);

        assert!(key.starts_with(&collection_prefix("users")));
        assert_eq!(id_from_primary_key(&key), Some(id));
        assert_eq!(id_from_primary_key(&index_prefix("users", "email")), None);
    }
}

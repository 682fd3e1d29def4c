use crate::key::{Key, KeyDecodeError, KeyPart};
use proptest::prelude::*;
use std::cmp::Ordering;

fn key(parts: impl IntoIterator<Item = KeyPart>) -> Key {
    Key::new(parts.into_iter().collect())
}

fn assert_encoded_order(left: &Key, right: &Key, expected: Ordering) {
    assert_eq!(left.to_bytes().cmp(&right.to_bytes()), expected);
}

#[test]
fn encoding_respects_numeric_order_for_ints() {
    assert_encoded_order(
        &key([KeyPart::Int(-2)]),
        &key([KeyPart::Int(7)]),
        Ordering::Less,
    );
    assert_encoded_order(
        &key([KeyPart::Int(i64::MIN)]),
        &key([KeyPart::Int(0)]),
        Ordering::Less,
    );
    assert_encoded_order(
        &key([KeyPart::Uint(255)]),
        &key([KeyPart::Uint(256)]),
        Ordering::Less,
    );
}

#[test]
fn encoding_escapes_embedded_zero_bytes() {
    let plain = key([KeyPart::from("a")]);
    let with_nul = key([KeyPart::from("a\0")]);
    let with_one = key([KeyPart::from("a\u{1}")]);

    assert_encoded_order(&plain, &with_nul, Ordering::Less);
    assert_encoded_order(&with_nul, &with_one, Ordering::Less);
    assert_eq!(Key::from_bytes(&with_nul.to_bytes()).unwrap(), with_nul);
}

#[test]
fn collection_prefix_does_not_cover_index_keyspace() {
    let collection = Key::default().with("users");
    let primary = Key::default().with("users").with("01J0000000000000000000000");
    let index = Key::default().with("users_by_email").with("a@b.c");

    assert!(primary.to_bytes().starts_with(&collection.to_bytes()));
    assert!(!index.to_bytes().starts_with(&collection.to_bytes()));
}

#[test]
fn decode_rejects_unknown_tag() {
    let err = Key::from_bytes(&[0x7F]).unwrap_err();

    assert_eq!(err, KeyDecodeError::UnknownTag { tag: 0x7F, offset: 0 });
}

#[test]
fn decode_rejects_unterminated_text() {
    let mut bytes = key([KeyPart::from("abc")]).to_bytes();
    bytes.truncate(bytes.len() - 1);

    assert!(matches!(
        Key::from_bytes(&bytes),
        Err(KeyDecodeError::Truncated { .. })
    ));
}

#[test]
fn decode_rejects_invalid_bool() {
    assert_eq!(
        Key::from_bytes(&[0x05, 0x02]).unwrap_err(),
        KeyDecodeError::InvalidBool { byte: 2 }
    );
}

#[test]
fn display_renders_tuple_shape() {
    let k = key([
        KeyPart::from("users"),
        KeyPart::Int(-4),
        KeyPart::Bytes(vec![0xAB]),
    ]);

    assert_eq!(k.to_string(), r#"["users", -4, 0xab]"#);
}

fn part_strategy() -> impl Strategy<Value = KeyPart> {
    prop_oneof![
        proptest::collection::vec(any::<u8>(), 0..8).prop_map(KeyPart::Bytes),
        ".{0,8}".prop_map(KeyPart::Text),
        any::<i64>().prop_map(KeyPart::Int),
        any::<u64>().prop_map(KeyPart::Uint),
        any::<bool>().prop_map(KeyPart::Bool),
    ]
}

fn key_strategy() -> impl Strategy<Value = Key> {
    proptest::collection::vec(part_strategy(), 0..4).prop_map(Key::new)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn encoded_order_matches_tuple_order(left in key_strategy(), right in key_strategy()) {
        prop_assert_eq!(left.to_bytes().cmp(&right.to_bytes()), left.cmp(&right));
    }

    #[test]
    fn tuple_prefix_is_byte_prefix(full in key_strategy(), cut in 0usize..4) {
        let prefix = Key::new(full.parts()[..cut.min(full.len())].to_vec());

        prop_assert!(full.to_bytes().starts_with(&prefix.to_bytes()));
        prop_assert_eq!(Key::from_bytes(&full.to_bytes()).unwrap(), full);
    }
}

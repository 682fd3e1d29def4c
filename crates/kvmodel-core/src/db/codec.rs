//! Stored value codecs.
//!
//! Primary entries hold the CBOR of a [`Record`]; index entries hold the CBOR
//! text of the target id. Anything that fails to decode is corruption, never
//! a missing record.

use crate::{
    db::Record,
    error::InternalError,
    key::Key,
    kv::MAX_VALUE_BYTES,
    serialize::{deserialize_bounded, serialize},
    traits::Model,
    types::RecordId,
};

/// Upper bound on a stored primary entry accepted on decode.
pub const MAX_ROW_BYTES: usize = MAX_VALUE_BYTES;

/// Upper bound on a stored index pointer accepted on decode.
pub const MAX_INDEX_VALUE_BYTES: usize = 256;

pub fn encode_record<M: Model>(record: &Record<M>) -> Result<Vec<u8>, InternalError> {
    Ok(serialize(record)?)
}

pub fn decode_record<M: Model>(key: &Key, bytes: &[u8]) -> Result<Record<M>, InternalError> {
    deserialize_bounded(bytes, MAX_ROW_BYTES).map_err(|err| {
        InternalError::serialize_corruption(format!("primary entry {key} failed to decode: {err}"))
    })
}

pub fn encode_id(id: &RecordId) -> Result<Vec<u8>, InternalError> {
    Ok(serialize(id)?)
}

pub fn decode_id(key: &Key, bytes: &[u8]) -> Result<RecordId, InternalError> {
    deserialize_bounded(bytes, MAX_INDEX_VALUE_BYTES).map_err(|err| {
        InternalError::index_corruption(format!("index entry {key} failed to decode: {err}"))
    })
}

///
/// TESTS
///

//! Core runtime for KvModel: record traits, keys, the store boundary, the
//! indexed record executors, and the vocabulary exported via the `prelude`.

// public exports are one module level down
pub mod config;
pub mod db;
pub mod error;
pub mod key;
pub mod kv;
pub mod model;
pub mod obs;
pub mod patch;
pub mod serialize;
pub mod traits;
pub mod types;

///
/// CONSTANTS
///

/// Maximum number of indexed fields allowed on one collection.
///
/// Every indexed field adds one mutation to each create, update, and delete
/// commit; the bound keeps a commit's size predictable.
pub const MAX_INDEXED_FIELDS: usize = 16;

///
/// Prelude
///
/// Prelude contains the vocabulary needed to declare and use a model.
/// No executors, stores, or serializers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::Record,
        key::KeyPart,
        kv::Consistency,
        model::index::IndexModel,
        patch::{MergePatch, MergePatchError, merge_field, merge_optional},
        traits::{Deserialize, Model, Serialize},
        types::RecordId,
    };
}

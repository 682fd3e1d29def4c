pub use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{model::index::IndexModel, patch::MergePatch};

// ============================================================================
// RECORD SHAPES
// ============================================================================
//
// These traits describe *what a record is*, not how it is stored.
//

///
/// Model
///
/// Compile-time declaration of one collection: its stable name and the
/// fields mirrored into secondary index keyspaces.
///
/// ## Semantics
/// - `COLLECTION` is the first key part of every primary key and the stem of
///   every index keyspace name; changing it orphans stored data
/// - `INDEXES` is fixed for the process lifetime; adding an index after
///   records exist leaves those records without entries (caller concern)
/// - The value must serialize as a map and must not declare its own `id`
///   field; the stored form is the value merged with `{ id }`
///

pub trait Model: Clone + DeserializeOwned + MergePatch + Send + Serialize + Sync + 'static {
    const COLLECTION: &'static str;
    const INDEXES: &'static [IndexModel<Self>];
}

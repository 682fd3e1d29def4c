use crate::types::RecordId;
use derive_more::{Deref, DerefMut};
use serde::{Deserialize, Serialize};

///
/// Record
///
/// A stored value together with its system-assigned id.
///
/// Serializes as the value's own map with an `id` entry merged in, which is
/// also the stored primary-entry shape. `Deref` reaches the typed value.
///

#[derive(Clone, Debug, Deref, DerefMut, Deserialize, Eq, PartialEq, Serialize)]
pub struct Record<M> {
    pub id: RecordId,

    #[deref]
    #[deref_mut]
    #[serde(flatten)]
    pub value: M,
}

impl<M> Record<M> {
    #[must_use]
    pub const fn new(id: RecordId, value: M) -> Self {
        Self { id, value }
    }

    #[must_use]
    pub const fn id(&self) -> &RecordId {
        &self.id
    }

    #[must_use]
    pub fn into_value(self) -> M {
        self.value
    }

    #[must_use]
    pub fn into_parts(self) -> (RecordId, M) {
        (self.id, self.value)
    }
}

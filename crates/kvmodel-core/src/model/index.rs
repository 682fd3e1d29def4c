use crate::key::KeyPart;
use std::fmt::{self, Debug, Display};

///
/// IndexModel
///
/// One indexed field of a record type: the field name used in the index
/// keyspace, and an extractor that reads the field's current value.
/// `None` from the extractor means the record does not set the field, so no
/// index entry exists for it.
///

pub struct IndexModel<M> {
    pub field: &'static str,
    pub extract: fn(&M) -> Option<KeyPart>,
}

impl<M> IndexModel<M> {
    #[must_use]
    pub const fn new(field: &'static str, extract: fn(&M) -> Option<KeyPart>) -> Self {
        Self { field, extract }
    }

    /// Current value of this field on `record`, if set.
    #[must_use]
    pub fn value(&self, record: &M) -> Option<KeyPart> {
        (self.extract)(record)
    }
}

// Manual impls: derives would demand `M: Clone`/`M: Debug`.
impl<M> Clone for IndexModel<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for IndexModel<M> {}

impl<M> Debug for IndexModel<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexModel")
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

impl<M> Display for IndexModel<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "by_{}", self.field)
    }
}

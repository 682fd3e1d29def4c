use crate::{
    db::{codec, layout},
    error::InternalError,
    key::{Key, KeyPart},
    kv::AtomicWrite,
    traits::Model,
    types::RecordId,
};

///
/// IndexDiff
///
/// Index mutations needed to move one record from `old` to `new`.
/// Fields whose value is unchanged produce nothing; an absent value on
/// either side means there is no entry to remove or write on that side.
///

#[derive(Debug, Default, Eq, PartialEq)]
pub struct IndexDiff {
    pub removes: Vec<Key>,
    pub inserts: Vec<Key>,
}

impl IndexDiff {
    /// Plan the diff between two states of one record.
    #[must_use]
    pub fn plan<M: Model>(old: Option<&M>, new: Option<&M>) -> Self {
        let mut diff = Self::default();

        for index in M::INDEXES {
            let before = old.and_then(|record| index.value(record));
            let after = new.and_then(|record| index.value(record));

            if before == after {
                continue;
            }
            if let Some(value) = before {
                diff.removes.push(layout::index_key(M::COLLECTION, index.field, value));
            }
            if let Some(value) = after {
                diff.inserts.push(layout::index_key(M::COLLECTION, index.field, value));
            }
        }

        diff
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.removes.is_empty() && self.inserts.is_empty()
    }

    #[must_use]
    pub fn insert_count(&self) -> u64 {
        u64::try_from(self.inserts.len()).unwrap_or(u64::MAX)
    }

    #[must_use]
    pub fn remove_count(&self) -> u64 {
        u64::try_from(self.removes.len()).unwrap_or(u64::MAX)
    }

    /// Stage the diff onto `write`, with every insert pointing at `id`.
    pub fn stage(&self, write: AtomicWrite, id: &RecordId) -> Result<AtomicWrite, InternalError> {
        let mut write = write;
        for key in &self.removes {
            write = write.delete(key.clone());
        }
        if !self.inserts.is_empty() {
            let pointer = codec::encode_id(id)?;
            for key in &self.inserts {
                write = write.set(key.clone(), pointer.clone());
            }
        }

        Ok(write)
    }
}

/// Current `(field, value)` pairs of `record`, skipping unset fields.
pub fn indexed_values<M: Model>(record: &M) -> impl Iterator<Item = (&'static str, KeyPart)> + '_ {
    M::INDEXES
        .iter()
        .filter_map(move |index| index.value(record).map(|value| (index.field, value)))
}

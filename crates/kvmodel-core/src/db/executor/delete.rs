use crate::{
    db::{Db, Record, codec, executor::record_index_delta, index::IndexDiff, layout},
    error::{ConflictError, WriteError, WriteOp},
    kv::{AtomicWrite, CommitResult, Consistency, KvStore},
    obs::{ExecKind, MetricsEvent, Span},
    traits::Model,
    types::RecordId,
};
use std::marker::PhantomData;

///
/// DeleteExecutor
///

pub struct DeleteExecutor<'a, M: Model, S: KvStore> {
    db: &'a Db<S>,
    _marker: PhantomData<M>,
}

impl<'a, M: Model, S: KvStore> DeleteExecutor<'a, M, S> {
    #[must_use]
    pub const fn new(db: &'a Db<S>) -> Self {
        Self {
            db,
            _marker: PhantomData,
        }
    }

    /// Remove the record and the index entry for every field it sets.
    pub fn delete(&self, id: &RecordId) -> Result<bool, WriteError> {
        let mut span = Span::new(self.db.metrics(), ExecKind::Delete, M::COLLECTION);
        let key = layout::primary_key(M::COLLECTION, id);

        let Some(entry) = self.db.store().get(&key, Consistency::Strong)? else {
            if self.db.config().debug {
                tracing::debug!("delete {}/{id}: not found", M::COLLECTION);
            }
            return Ok(false);
        };
        let current: Record<M> = codec::decode_record(&key, &entry.value)?;

        let diff = IndexDiff::plan(Some(&current.value), None);
        let write = diff.stage(AtomicWrite::new().delete(key), id)?;

        match self.db.store().commit(write)? {
            CommitResult::Committed { versionstamp } => {
                record_index_delta(self.db, M::COLLECTION, &diff);
                span.set_rows(1);
                if self.db.config().debug {
                    tracing::debug!(
                        "delete {}/{id} at {versionstamp} ({} index entries)",
                        M::COLLECTION,
                        diff.removes.len()
                    );
                }

                Ok(true)
            }
            CommitResult::Conflict => {
                self.db
                    .metrics()
                    .record(MetricsEvent::Conflict { collection: M::COLLECTION });

                Err(ConflictError::new(M::COLLECTION, WriteOp::Delete, id.clone()).into())
            }
        }
    }
}

use crate::{
    db::{Db, Record, codec, executor::record_index_delta, index::IndexDiff, layout},
    error::{ConflictError, InternalError, WriteError, WriteOp},
    kv::{AtomicWrite, CommitResult, Consistency, KvStore},
    obs::{ExecKind, MetricsEvent, Span},
    traits::Model,
    types::RecordId,
};
use std::marker::PhantomData;

///
/// SaveExecutor
///
/// Runs `create` and `update`. Both write the primary entry and the index
/// diff in one commit.
///

pub struct SaveExecutor<'a, M: Model, S: KvStore> {
    db: &'a Db<S>,
    _marker: PhantomData<M>,
}

impl<'a, M: Model, S: KvStore> SaveExecutor<'a, M, S> {
    #[must_use]
    pub const fn new(db: &'a Db<S>) -> Self {
        Self {
            db,
            _marker: PhantomData,
        }
    }

    /// Insert `value` under a fresh id.
    ///
    /// The commit checks that the primary key is absent. A failed check means
    /// the id is taken, so a new id is minted and the commit retried, up to
    /// `create_attempts` times in total.
    pub fn create(&self, value: M) -> Result<Record<M>, WriteError> {
        let mut span = Span::new(self.db.metrics(), ExecKind::Create, M::COLLECTION);
        let diff = IndexDiff::plan::<M>(None, Some(&value));
        let mut record = Record::new(RecordId::generate(), value);

        for attempt in 1..=self.db.config().create_attempts {
            if attempt > 1 {
                record.id = RecordId::generate();
            }

            let key = layout::primary_key(M::COLLECTION, &record.id);
            let write = AtomicWrite::new()
                .check(key.clone(), None)
                .set(key, codec::encode_record(&record)?);
            let write = diff.stage(write, &record.id)?;

            match self.db.store().commit(write)? {
                CommitResult::Committed { versionstamp } => {
                    record_index_delta(self.db, M::COLLECTION, &diff);
                    span.set_rows(1);
                    if self.db.config().debug {
                        tracing::debug!(
                            "create {}/{} at {versionstamp} ({} index entries)",
                            M::COLLECTION,
                            record.id,
                            diff.inserts.len()
                        );
                    }

                    return Ok(record);
                }
                CommitResult::Conflict => {
                    self.db
                        .metrics()
                        .record(MetricsEvent::Conflict { collection: M::COLLECTION });
                    tracing::warn!(
                        "create {}/{} conflicted on attempt {attempt}, minting a new id",
                        M::COLLECTION,
                        record.id
                    );
                }
            }
        }

        Err(ConflictError::new(M::COLLECTION, WriteOp::Create, record.id).into())
    }

    /// Merge `patch` over the committed record.
    ///
    /// The index diff is computed from the record read here. The commit does
    /// not check that record's versionstamp, so a concurrent write between
    /// the read and the commit is overwritten.
    pub fn update(&self, id: &RecordId, patch: M::Patch) -> Result<Option<Record<M>>, WriteError> {
        let mut span = Span::new(self.db.metrics(), ExecKind::Update, M::COLLECTION);
        let key = layout::primary_key(M::COLLECTION, id);

        let Some(entry) = self.db.store().get(&key, Consistency::Strong)? else {
            if self.db.config().debug {
                tracing::debug!("update {}/{id}: not found", M::COLLECTION);
            }
            return Ok(None);
        };
        let current: Record<M> = codec::decode_record(&key, &entry.value)?;

        let mut next = current.value.clone();
        next.merge(patch).map_err(InternalError::from)?;

        let diff = IndexDiff::plan(Some(&current.value), Some(&next));
        let record = Record::new(id.clone(), next);

        let write = AtomicWrite::new().set(key, codec::encode_record(&record)?);
        let write = diff.stage(write, id)?;

        match self.db.store().commit(write)? {
            CommitResult::Committed { versionstamp } => {
                record_index_delta(self.db, M::COLLECTION, &diff);
                span.set_rows(1);
                if self.db.config().debug {
                    tracing::debug!(
                        "update {}/{id} at {versionstamp} (-{} +{} index entries)",
                        M::COLLECTION,
                        diff.removes.len(),
                        diff.inserts.len()
                    );
                }

                Ok(Some(record))
            }
            CommitResult::Conflict => {
                self.db
                    .metrics()
                    .record(MetricsEvent::Conflict { collection: M::COLLECTION });

                Err(ConflictError::new(M::COLLECTION, WriteOp::Update, id.clone()).into())
            }
        }
    }
}

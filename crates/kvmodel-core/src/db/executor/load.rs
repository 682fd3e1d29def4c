use crate::{
    db::{Db, Record, codec, layout},
    error::InternalError,
    key::KeyPart,
    kv::{Consistency, KvList, KvStore, ListOptions},
    model,
    obs::{ExecKind, MetricsEvent, MetricsSink, Span},
    traits::Model,
    types::RecordId,
};
use std::marker::PhantomData;

///
/// LoadExecutor
///

pub struct LoadExecutor<'a, M: Model, S: KvStore> {
    db: &'a Db<S>,
    _marker: PhantomData<M>,
}

impl<'a, M: Model, S: KvStore> LoadExecutor<'a, M, S> {
    #[must_use]
    pub const fn new(db: &'a Db<S>) -> Self {
        Self {
            db,
            _marker: PhantomData,
        }
    }

    pub fn find(
        &self,
        id: &RecordId,
        consistency: Consistency,
    ) -> Result<Option<Record<M>>, InternalError> {
        let mut span = Span::new(self.db.metrics(), ExecKind::Load, M::COLLECTION);
        let record = self.load(id, consistency)?;

        if record.is_some() {
            span.set_rows(1);
        }
        if self.db.config().debug {
            tracing::debug!(
                "find {}/{id} ({consistency}): {}",
                M::COLLECTION,
                if record.is_some() { "hit" } else { "miss" }
            );
        }

        Ok(record)
    }

    #[must_use]
    pub fn find_all(&self, options: ListOptions) -> RecordScan<'a, M, S> {
        if self.db.config().debug {
            tracing::debug!(
                "find_all {} (limit {:?}, reverse {}, batch {}, {})",
                M::COLLECTION,
                options.limit,
                options.reverse,
                options.batch_size,
                options.consistency
            );
        }

        RecordScan::new(self.db, options)
    }

    pub fn find_by_index(
        &self,
        field: &str,
        value: KeyPart,
        consistency: Consistency,
    ) -> Result<Option<Record<M>>, InternalError> {
        let Some(index) = model::index_for::<M>(field) else {
            return Err(InternalError::index_unsupported(format!(
                "collection '{}' has no index on '{field}'",
                M::COLLECTION
            )));
        };

        let mut span = Span::new(self.db.metrics(), ExecKind::Load, M::COLLECTION);
        let key = layout::index_key(M::COLLECTION, index.field, value);

        let Some(entry) = self.db.store().get(&key, consistency)? else {
            if self.db.config().debug {
                tracing::debug!("find_by_index {key}: no entry");
            }
            return Ok(None);
        };
        let id = codec::decode_id(&key, &entry.value)?;

        let Some(record) = self.load(&id, consistency)? else {
            self.db
                .metrics()
                .record(MetricsEvent::DanglingIndex { collection: M::COLLECTION });
            tracing::warn!("index entry {key} points at missing record {id}, skipping");
            return Ok(None);
        };

        span.set_rows(1);
        if self.db.config().debug {
            tracing::debug!("find_by_index {key}: {id}");
        }

        Ok(Some(record))
    }

    fn load(&self, id: &RecordId, consistency: Consistency) -> Result<Option<Record<M>>, InternalError> {
        let key = layout::primary_key(M::COLLECTION, id);

        self.db
            .store()
            .get(&key, consistency)?
            .map(|entry| codec::decode_record(&key, &entry.value))
            .transpose()
    }
}

///
/// RecordScan
///
/// Lazy ordered iteration over a collection's primary keyspace.
///
/// Pages are fetched on demand, so each record is observed either before or
/// after any concurrent write to it, never torn. The scan is finite and
/// cannot be restarted; issue a new `find_all` instead. The first error ends
/// the scan.
///

pub struct RecordScan<'a, M: Model, S: KvStore> {
    entries: KvList<'a, S>,
    sink: &'a dyn MetricsSink,
    scanned: u64,
    failed: bool,
    _marker: PhantomData<M>,
}

impl<'a, M: Model, S: KvStore> RecordScan<'a, M, S> {
    fn new(db: &'a Db<S>, options: ListOptions) -> Self {
        Self {
            entries: KvList::new(db.store(), layout::collection_prefix(M::COLLECTION), options),
            sink: db.metrics(),
            scanned: 0,
            failed: false,
            _marker: PhantomData,
        }
    }

    /// Entries read from the store so far.
    #[must_use]
    pub const fn scanned(&self) -> u64 {
        self.scanned
    }
}

impl<M: Model, S: KvStore> Iterator for RecordScan<'_, M, S> {
    type Item = Result<Record<M>, InternalError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let result = match self.entries.next()? {
            Ok(entry) => {
                self.scanned = self.scanned.saturating_add(1);
                codec::decode_record(&entry.key, &entry.value)
            }
            Err(err) => Err(err.into()),
        };
        if result.is_err() {
            self.failed = true;
        }

        Some(result)
    }
}

impl<M: Model, S: KvStore> Drop for RecordScan<'_, M, S> {
    fn drop(&mut self) {
        if self.scanned > 0 {
            self.sink.record(MetricsEvent::RowsScanned {
                collection: M::COLLECTION,
                rows_scanned: self.scanned,
            });
        }
    }
}

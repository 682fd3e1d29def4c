//! Indexed record store.
//!
//! A [`Db`] wraps one [`KvStore`]. Each [`Collection`] handle maps a
//! [`Model`] onto a primary keyspace plus one secondary keyspace per indexed
//! field, and keeps both in step: every mutation is a single atomic commit
//! carrying the primary change and its index diff together.

mod codec;
mod executor;
mod index;
mod integrity;
pub mod layout;
mod record;

#[cfg(test)]
mod tests;

pub use executor::RecordScan;
pub use integrity::IntegrityReport;
pub use record::Record;

use crate::{
    config::ModelConfig,
    db::executor::{DeleteExecutor, LoadExecutor, SaveExecutor},
    error::{InternalError, WriteError},
    key::KeyPart,
    kv::{Consistency, KvStore, ListOptions},
    model,
    obs::{GlobalMetricsSink, MetricsSink},
    traits::Model,
    types::RecordId,
};
use std::{marker::PhantomData, sync::Arc};

///
/// Db
///
/// Handle over one transactional store. Holds no record state of its own, so
/// it can be shared across threads behind an `Arc`.
///

pub struct Db<S: KvStore> {
    store: S,
    config: ModelConfig,
    metrics: Arc<dyn MetricsSink>,
}

impl<S: KvStore> Db<S> {
    /// Open a handle with the default config and the global metrics sink.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: ModelConfig::default(),
            metrics: Arc::new(GlobalMetricsSink),
        }
    }

    /// Open a handle with an explicit config.
    pub fn with_config(store: S, config: ModelConfig) -> Result<Self, InternalError> {
        config.validate()?;

        Ok(Self {
            store,
            config,
            metrics: Arc::new(GlobalMetricsSink),
        })
    }

    /// Route metrics events to `sink` instead of the global counters.
    #[must_use]
    pub fn with_metrics_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.metrics = sink;
        self
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub(crate) fn metrics(&self) -> &dyn MetricsSink {
        self.metrics.as_ref()
    }

    /// Validate `M`'s declaration and return a handle over its collection.
    pub fn collection<M: Model>(&self) -> Result<Collection<'_, M, S>, InternalError> {
        model::validate::<M>()?;

        Ok(Collection {
            db: self,
            _marker: PhantomData,
        })
    }
}

///
/// Collection
///
/// Typed handle over one collection. Cheap to copy; borrows the [`Db`].
///

pub struct Collection<'a, M: Model, S: KvStore> {
    db: &'a Db<S>,
    _marker: PhantomData<M>,
}

impl<M: Model, S: KvStore> Clone for Collection<'_, M, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: Model, S: KvStore> Copy for Collection<'_, M, S> {}

impl<'a, M: Model, S: KvStore> Collection<'a, M, S> {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        M::COLLECTION
    }

    /// List options seeded from the handle's config.
    #[must_use]
    pub fn list_options(&self) -> ListOptions {
        ListOptions::default()
            .batch_size(self.db.config.scan_batch_size)
            .consistency(self.db.config.consistency)
    }

    // ======================================================================
    // Mutations
    // ======================================================================

    /// Store `value` under a freshly generated id along with its index entries.
    pub fn create(&self, value: M) -> Result<Record<M>, WriteError> {
        SaveExecutor::<M, S>::new(self.db).create(value)
    }

    /// Merge `patch` over the stored record and re-index changed fields.
    /// Returns `Ok(None)` without writing when `id` is not live.
    pub fn update(&self, id: &RecordId, patch: M::Patch) -> Result<Option<Record<M>>, WriteError> {
        SaveExecutor::<M, S>::new(self.db).update(id, patch)
    }

    /// Remove the record and its index entries. Returns whether it was live.
    pub fn delete(&self, id: &RecordId) -> Result<bool, WriteError> {
        DeleteExecutor::<M, S>::new(self.db).delete(id)
    }

    // ======================================================================
    // Reads
    // ======================================================================

    /// Point lookup by id.
    pub fn find(
        &self,
        id: &RecordId,
        consistency: Consistency,
    ) -> Result<Option<Record<M>>, InternalError> {
        LoadExecutor::<M, S>::new(self.db).find(id, consistency)
    }

    /// Lazy ordered scan over every live record.
    #[must_use]
    pub fn find_all(&self, options: ListOptions) -> RecordScan<'a, M, S> {
        LoadExecutor::<M, S>::new(self.db).find_all(options)
    }

    /// Resolve a record through the index on `field`.
    ///
    /// A pointer whose target record is gone yields `None`, never the stale id.
    pub fn find_by_index(
        &self,
        field: &str,
        value: impl Into<KeyPart>,
        consistency: Consistency,
    ) -> Result<Option<Record<M>>, InternalError> {
        LoadExecutor::<M, S>::new(self.db).find_by_index(field, value.into(), consistency)
    }

    // ======================================================================
    // Diagnostics
    // ======================================================================

    /// Cross-check the primary keyspace against every index keyspace.
    pub fn check_integrity(&self, consistency: Consistency) -> Result<IntegrityReport, InternalError> {
        integrity::check::<M, S>(self.db, consistency)
    }
}

use crate::error::Error;
use kvmodel_core::{
    self as core,
    config::ModelConfig,
    db::{IntegrityReport, Record},
    key::KeyPart,
    kv::{Consistency, KvStore, ListOptions},
    obs::MetricsSink,
    traits::Model,
    types::RecordId,
};
use std::sync::Arc;

///
/// DbSession
/// Public facade over a core `Db`.
/// Converts core errors into `kvmodel::Error`.
///

pub struct DbSession<S: KvStore> {
    inner: core::db::Db<S>,
}

impl<S: KvStore> DbSession<S> {
    /// Open a session with the default config.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            inner: core::db::Db::new(store),
        }
    }

    /// Open a session with an explicit config.
    pub fn with_config(store: S, config: ModelConfig) -> Result<Self, Error> {
        Ok(Self {
            inner: core::db::Db::with_config(store, config)?,
        })
    }

    /// Parse a TOML config document and open a session with it.
    pub fn from_toml(store: S, source: &str) -> Result<Self, Error> {
        let config = ModelConfig::from_toml_str(source).map_err(core::error::InternalError::from)?;

        Self::with_config(store, config)
    }

    /// Override the metrics sink for operations run through this session.
    #[must_use]
    pub fn metrics_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.inner = self.inner.with_metrics_sink(sink);
        self
    }

    #[must_use]
    pub const fn db(&self) -> &core::db::Db<S> {
        &self.inner
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        self.inner.store()
    }

    /// Typed handle over `M`'s collection.
    pub fn collection<M: Model>(&self) -> Result<SessionCollection<'_, M, S>, Error> {
        Ok(SessionCollection {
            inner: self.inner.collection::<M>()?,
        })
    }
}

///
/// SessionCollection
///

pub struct SessionCollection<'a, M: Model, S: KvStore> {
    inner: core::db::Collection<'a, M, S>,
}

impl<'a, M: Model, S: KvStore> SessionCollection<'a, M, S> {
    pub fn create(&self, value: M) -> Result<Record<M>, Error> {
        Ok(self.inner.create(value)?)
    }

    pub fn update(&self, id: &RecordId, patch: M::Patch) -> Result<Option<Record<M>>, Error> {
        Ok(self.inner.update(id, patch)?)
    }

    pub fn delete(&self, id: &RecordId) -> Result<bool, Error> {
        Ok(self.inner.delete(id)?)
    }

    pub fn find(&self, id: &RecordId, consistency: Consistency) -> Result<Option<Record<M>>, Error> {
        Ok(self.inner.find(id, consistency)?)
    }

    /// Lazy scan seeded with the session's default list options.
    pub fn find_all(&self) -> impl Iterator<Item = Result<Record<M>, Error>> + use<'a, M, S> {
        self.find_all_with(self.inner.list_options())
    }

    pub fn find_all_with(
        &self,
        options: ListOptions,
    ) -> impl Iterator<Item = Result<Record<M>, Error>> + use<'a, M, S> {
        self.inner
            .find_all(options)
            .map(|result| result.map_err(Error::from))
    }

    pub fn find_by_index(
        &self,
        field: &str,
        value: impl Into<KeyPart>,
        consistency: Consistency,
    ) -> Result<Option<Record<M>>, Error> {
        Ok(self.inner.find_by_index(field, value, consistency)?)
    }

    pub fn check_integrity(&self, consistency: Consistency) -> Result<IntegrityReport, Error> {
        Ok(self.inner.check_integrity(consistency)?)
    }
}

//! Transactional key-value store boundary.
//!
//! Everything the record layer needs from the underlying store lives behind
//! [`KvStore`]: point reads, ordered prefix scans, and an all-or-nothing
//! batch commit with versionstamp checks for conflict detection.
//!
//! `memory` ships an in-process implementation used for embedding and tests.

mod atomic;
mod list;
pub mod memory;

pub use atomic::{AtomicWrite, Check, CommitResult, Mutation, MutationKind};
pub use list::{DEFAULT_BATCH_SIZE, KvList, ListOptions};
pub use memory::MemoryKv;

use crate::key::Key;
use derive_more::Display;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error as ThisError;

/// Maximum encoded key size accepted by a commit.
pub const MAX_KEY_BYTES: usize = 2048;

/// Maximum value size accepted by a commit.
pub const MAX_VALUE_BYTES: usize = 64 * 1024;

///
/// Consistency
///
/// Per-read consistency policy. `Strong` reads are linearizable; `Eventual`
/// reads may be served by a stale replica. The record layer passes this
/// through untouched.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Consistency {
    #[default]
    #[display("strong")]
    Strong,

    #[display("eventual")]
    Eventual,
}

///
/// Versionstamp
///
/// Store commit sequence at which an entry was last written.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Versionstamp(pub u64);

///
/// KvEntry
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KvEntry {
    pub key: Key,
    pub value: Vec<u8>,
    pub versionstamp: Versionstamp,
}

///
/// KvError
///
/// Failures reported by a store implementation. The record layer never
/// translates these; they reach the caller wrapped but unchanged.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum KvError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store transport failure: {0}")]
    Transport(String),

    #[error("key exceeds max size: {len} bytes (limit {max})")]
    KeyTooLarge { len: usize, max: usize },

    #[error("value exceeds max size: {len} bytes (limit {max})")]
    ValueTooLarge { len: usize, max: usize },

    #[error("store data corrupted: {0}")]
    Corrupt(String),
}

///
/// ScanRequest
///
/// One bounded page of a prefix scan. `after` is the last key already seen;
/// forward scans resume strictly above it, reverse scans strictly below.
///

#[derive(Clone, Copy, Debug)]
pub struct ScanRequest<'a> {
    pub prefix: &'a Key,
    pub after: Option<&'a Key>,
    pub limit: usize,
    pub reverse: bool,
    pub consistency: Consistency,
}

///
/// KvStore
///
/// Sorted, transactional key-value store.
///
/// Implementations must apply a committed [`AtomicWrite`] entirely or not at
/// all, and must report a failed check as [`CommitResult::Conflict`] rather
/// than as an error.
///

pub trait KvStore: Send + Sync {
    /// Point read.
    fn get(&self, key: &Key, consistency: Consistency) -> Result<Option<KvEntry>, KvError>;

    /// Read one ordered page of entries whose keys start with `request.prefix`.
    fn scan_batch(&self, request: &ScanRequest<'_>) -> Result<Vec<KvEntry>, KvError>;

    /// Apply all checks and mutations as one unit.
    fn commit(&self, write: AtomicWrite) -> Result<CommitResult, KvError>;

    /// Lazily list every entry under `prefix`, paging through `scan_batch`.
    fn list(&self, prefix: Key, options: ListOptions) -> KvList<'_, Self>
    where
        Self: Sized,
    {
        KvList::new(self, prefix, options)
    }
}

impl<S: KvStore + ?Sized> KvStore for Arc<S> {
    fn get(&self, key: &Key, consistency: Consistency) -> Result<Option<KvEntry>, KvError> {
        (**self).get(key, consistency)
    }

    fn scan_batch(&self, request: &ScanRequest<'_>) -> Result<Vec<KvEntry>, KvError> {
        (**self).scan_batch(request)
    }

    fn commit(&self, write: AtomicWrite) -> Result<CommitResult, KvError> {
        (**self).commit(write)
    }
}

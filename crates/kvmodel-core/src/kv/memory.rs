use crate::{
    key::Key,
    kv::{
        AtomicWrite, CommitResult, Consistency, KvEntry, KvError, KvStore, MAX_KEY_BYTES,
        MAX_VALUE_BYTES, MutationKind, ScanRequest, Versionstamp,
    },
};
use parking_lot::RwLock;
use std::{
    collections::BTreeMap,
    ops::Bound,
    sync::atomic::{AtomicUsize, Ordering},
};

///
/// MemoryKv
///
/// In-process sorted store keyed by canonical key bytes.
///
/// Commits run under a single write lock, so checks and mutations land as one
/// unit. There is one replica: `Consistency::Eventual` reads see the same
/// state as strong reads.
///

#[derive(Default)]
pub struct MemoryKv {
    state: RwLock<MemoryState>,
    faults: Faults,
}

#[derive(Default)]
struct MemoryState {
    entries: BTreeMap<Vec<u8>, StoredEntry>,
    version: u64,
}

struct StoredEntry {
    value: Vec<u8>,
    versionstamp: Versionstamp,
}

// Test hooks: each counter makes the next N calls of one kind misbehave.
#[derive(Default)]
struct Faults {
    failing_reads: AtomicUsize,
    failing_commits: AtomicUsize,
    conflicting_commits: AtomicUsize,
}

impl Faults {
    fn take(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl MemoryKv {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries across all keyspaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    /// Latest committed versionstamp (zero before the first commit).
    #[must_use]
    pub fn version(&self) -> Versionstamp {
        Versionstamp(self.state.read().version)
    }

    /// Make the next `n` reads (gets and scan pages) fail as unavailable.
    pub fn fail_next_reads(&self, n: usize) {
        self.faults.failing_reads.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` commits fail as unavailable without applying.
    pub fn fail_next_commits(&self, n: usize) {
        self.faults.failing_commits.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` commits report a conflict without applying.
    pub fn conflict_next_commits(&self, n: usize) {
        self.faults.conflicting_commits.store(n, Ordering::SeqCst);
    }

    fn check_read_fault(&self) -> Result<(), KvError> {
        if Faults::take(&self.faults.failing_reads) {
            return Err(KvError::Unavailable("injected read failure".to_string()));
        }

        Ok(())
    }

    fn decode_entry(raw_key: &[u8], entry: &StoredEntry) -> Result<KvEntry, KvError> {
        let key = Key::from_bytes(raw_key).map_err(|err| KvError::Corrupt(err.to_string()))?;

        Ok(KvEntry {
            key,
            value: entry.value.clone(),
            versionstamp: entry.versionstamp,
        })
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &Key, _consistency: Consistency) -> Result<Option<KvEntry>, KvError> {
        self.check_read_fault()?;

        let raw_key = key.to_bytes();
        let state = self.state.read();

        state
            .entries
            .get(&raw_key)
            .map(|entry| Self::decode_entry(&raw_key, entry))
            .transpose()
    }

    fn scan_batch(&self, request: &ScanRequest<'_>) -> Result<Vec<KvEntry>, KvError> {
        self.check_read_fault()?;

        let prefix = request.prefix.to_bytes();
        let after = request.after.map(Key::to_bytes);
        let prefix_end = prefix_successor(&prefix).map_or(Bound::Unbounded, Bound::Excluded);

        let (lower, upper) = match (&after, request.reverse) {
            (Some(after), false) => (Bound::Excluded(after.clone()), prefix_end),
            (Some(after), true) => (Bound::Included(prefix), Bound::Excluded(after.clone())),
            (None, _) => (Bound::Included(prefix), prefix_end),
        };

        let state = self.state.read();
        let range = state.entries.range((lower, upper));

        if request.reverse {
            range
                .rev()
                .take(request.limit)
                .map(|(raw_key, entry)| Self::decode_entry(raw_key, entry))
                .collect()
        } else {
            range
                .take(request.limit)
                .map(|(raw_key, entry)| Self::decode_entry(raw_key, entry))
                .collect()
        }
    }

    fn commit(&self, write: AtomicWrite) -> Result<CommitResult, KvError> {
        if Faults::take(&self.faults.failing_commits) {
            return Err(KvError::Unavailable("injected commit failure".to_string()));
        }
        if Faults::take(&self.faults.conflicting_commits) {
            return Ok(CommitResult::Conflict);
        }

        let (checks, mutations) = write.into_parts();

        // Encode and size-check everything before taking the lock.
        let mut encoded = Vec::with_capacity(mutations.len());
        for mutation in mutations {
            let raw_key = encode_bounded_key(&mutation.key)?;
            if let MutationKind::Set(value) = &mutation.kind
                && value.len() > MAX_VALUE_BYTES
            {
                return Err(KvError::ValueTooLarge {
                    len: value.len(),
                    max: MAX_VALUE_BYTES,
                });
            }
            encoded.push((raw_key, mutation.kind));
        }

        let mut state = self.state.write();

        for check in &checks {
            let current = state
                .entries
                .get(&check.key.to_bytes())
                .map(|entry| entry.versionstamp);
            if current != check.versionstamp {
                return Ok(CommitResult::Conflict);
            }
        }

        state.version = state.version.saturating_add(1);
        let versionstamp = Versionstamp(state.version);

        for (raw_key, kind) in encoded {
            match kind {
                MutationKind::Set(value) => {
                    state.entries.insert(
                        raw_key,
                        StoredEntry {
                            value,
                            versionstamp,
                        },
                    );
                }
                MutationKind::Delete => {
                    state.entries.remove(&raw_key);
                }
            }
        }

        Ok(CommitResult::Committed { versionstamp })
    }
}

fn encode_bounded_key(key: &Key) -> Result<Vec<u8>, KvError> {
    let raw_key = key.to_bytes();
    if raw_key.len() > MAX_KEY_BYTES {
        return Err(KvError::KeyTooLarge {
            len: raw_key.len(),
            max: MAX_KEY_BYTES,
        });
    }

    Ok(raw_key)
}

// Smallest byte string greater than every string starting with `prefix`.
fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }

    None
}

///
/// TESTS
///

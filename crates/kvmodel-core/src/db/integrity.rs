use crate::{
    db::{Db, Record, codec, index::indexed_values, layout},
    error::InternalError,
    key::Key,
    kv::{Consistency, KvStore, ListOptions},
    traits::Model,
    types::RecordId,
};
use std::collections::{BTreeMap, BTreeSet};

///
/// IntegrityReport
///
/// Result of cross-checking a collection's primary keyspace against its
/// index keyspaces.
///
/// - `missing`: a live record sets a field value with no entry pointing at it
/// - `dangling`: an entry points at a record that is not live
/// - `stale`: an entry points at a live record that no longer holds its value
/// - `shadowed`: live records that hold a value whose entry points at another
///   holder; expected with non-unique indexes and not counted as damage
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct IntegrityReport {
    pub records: u64,
    pub index_entries: u64,
    pub missing: u64,
    pub dangling: u64,
    pub stale: u64,
    pub shadowed: u64,
}

impl IntegrityReport {
    /// No missing, dangling, or stale entries.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        self.missing == 0 && self.dangling == 0 && self.stale == 0
    }
}

// Scans every keyspace of the collection once. Live ids and the expected
// index keys are held in memory for the duration of the check.
pub fn check<M: Model, S: KvStore>(
    db: &Db<S>,
    consistency: Consistency,
) -> Result<IntegrityReport, InternalError> {
    let options = ListOptions::default()
        .batch_size(db.config().scan_batch_size)
        .consistency(consistency);

    let mut report = IntegrityReport::default();
    let mut live = BTreeSet::new();
    let mut expected: BTreeMap<Key, BTreeSet<RecordId>> = BTreeMap::new();

    for entry in db.store().list(layout::collection_prefix(M::COLLECTION), options) {
        let entry = entry?;
        let record: Record<M> = codec::decode_record(&entry.key, &entry.value)?;
        let id = layout::id_from_primary_key(&entry.key).ok_or_else(|| {
            InternalError::store_corruption(format!("malformed primary key {}", entry.key))
        })?;

        for (field, value) in indexed_values(&record.value) {
            expected
                .entry(layout::index_key(M::COLLECTION, field, value))
                .or_default()
                .insert(id.clone());
        }
        live.insert(id);
        report.records += 1;
    }

    for index in M::INDEXES {
        let prefix = layout::index_prefix(M::COLLECTION, index.field);

        for entry in db.store().list(prefix, options) {
            let entry = entry?;
            let target = codec::decode_id(&entry.key, &entry.value)?;
            report.index_entries += 1;

            let holders = expected.remove(&entry.key).unwrap_or_default();
            let holder_count = u64::try_from(holders.len()).unwrap_or(u64::MAX);

            if holders.contains(&target) {
                report.shadowed += holder_count - 1;
            } else {
                if live.contains(&target) {
                    report.stale += 1;
                } else {
                    report.dangling += 1;
                }
                report.missing += holder_count;
            }
        }
    }

    // Whatever is left was expected but never seen.
    report.missing += expected
        .values()
        .map(|holders| u64::try_from(holders.len()).unwrap_or(u64::MAX))
        .sum::<u64>();

    if !report.is_consistent() {
        tracing::warn!(
            "integrity check on {}: {} missing, {} dangling, {} stale",
            M::COLLECTION,
            report.missing,
            report.dangling,
            report.stale
        );
    }

    Ok(report)
}

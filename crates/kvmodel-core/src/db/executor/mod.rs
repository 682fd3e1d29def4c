//! Operation executors.
//!
//! Each executor runs one family of operations against a [`Db`] and owns the
//! instrumentation for it: an RAII span per call plus index and conflict
//! events.

mod delete;
mod load;
mod save;

pub use delete::DeleteExecutor;
pub use load::{LoadExecutor, RecordScan};
pub use save::SaveExecutor;

use crate::{
    db::{Db, index::IndexDiff},
    kv::KvStore,
    obs::MetricsEvent,
};

// Record the index side of a committed write.
fn record_index_delta<S: KvStore>(db: &Db<S>, collection: &'static str, diff: &IndexDiff) {
    if diff.is_empty() {
        return;
    }

    db.metrics().record(MetricsEvent::IndexDelta {
        collection,
        inserts: diff.insert_count(),
        removes: diff.remove_count(),
    });
}

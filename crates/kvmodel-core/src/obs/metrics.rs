use parking_lot::Mutex;
use serde::Serialize;
use std::{collections::BTreeMap, sync::LazyLock};

///
/// EventState
/// Ephemeral, in-memory counters for record-store operations.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub collections: BTreeMap<String, CollectionCounters>,
}

/// Point-in-time copy of the counters.
pub type EventReport = EventState;

///
/// EventOps
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Operation entrypoints
    pub create_calls: u64,
    pub load_calls: u64,
    pub update_calls: u64,
    pub delete_calls: u64,

    // Rows touched
    pub rows_loaded: u64,
    pub rows_scanned: u64,
    pub rows_written: u64,
    pub rows_deleted: u64,

    // Index maintenance
    pub index_inserts: u64,
    pub index_removes: u64,
    pub dangling_index_hits: u64,

    // Commit outcomes
    pub conflicts: u64,

    // Wall time across finished operations
    pub exec_micros_total: u128,
    pub exec_micros_max: u64,
}

///
/// CollectionCounters
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct CollectionCounters {
    pub create_calls: u64,
    pub load_calls: u64,
    pub update_calls: u64,
    pub delete_calls: u64,
    pub rows_loaded: u64,
    pub rows_scanned: u64,
    pub rows_written: u64,
    pub rows_deleted: u64,
    pub index_inserts: u64,
    pub index_removes: u64,
    pub dangling_index_hits: u64,
    pub conflicts: u64,
}

static EVENT_STATE: LazyLock<Mutex<EventState>> = LazyLock::new(|| Mutex::new(EventState::default()));

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    f(&mut EVENT_STATE.lock())
}

/// Snapshot all counters.
pub(crate) fn report() -> EventReport {
    EVENT_STATE.lock().clone()
}

/// Reset all counters (useful in tests).
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

/// Accumulate a duration total and track a max.
pub(crate) fn add_micros(total: &mut u128, max: &mut u64, delta: u64) {
    *total = total.saturating_add(u128::from(delta));
    if delta > *max {
        *max = delta;
    }
}

//! Metrics sink boundary.
//!
//! Record-store logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
//!
//! This module is the only allowed bridge between execution logic
//! and the global metrics state.
use crate::obs::metrics::{self, CollectionCounters, EventReport};
use std::time::Instant;

///
/// ExecKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecKind {
    Create,
    Load,
    Update,
    Delete,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    ExecStart {
        kind: ExecKind,
        collection: &'static str,
    },
    ExecFinish {
        kind: ExecKind,
        collection: &'static str,
        rows_touched: u64,
        micros: u64,
    },
    RowsScanned {
        collection: &'static str,
        rows_scanned: u64,
    },
    IndexDelta {
        collection: &'static str,
        inserts: u64,
        removes: u64,
    },
    DanglingIndex {
        collection: &'static str,
    },
    Conflict {
        collection: &'static str,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default process-wide sink that folds events into global counters.

#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalMetricsSink;

impl GlobalMetricsSink {
    fn with_collection(collection: &str, f: impl FnOnce(&mut CollectionCounters)) {
        metrics::with_state_mut(|m| {
            f(m.collections.entry(collection.to_string()).or_default());
        });
    }
}

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::ExecStart { kind, collection } => {
                metrics::with_state_mut(|m| {
                    let ops = &mut m.ops;
                    match kind {
                        ExecKind::Create => ops.create_calls = ops.create_calls.saturating_add(1),
                        ExecKind::Load => ops.load_calls = ops.load_calls.saturating_add(1),
                        ExecKind::Update => ops.update_calls = ops.update_calls.saturating_add(1),
                        ExecKind::Delete => ops.delete_calls = ops.delete_calls.saturating_add(1),
                    }
                });
                Self::with_collection(collection, |entry| match kind {
                    ExecKind::Create => entry.create_calls = entry.create_calls.saturating_add(1),
                    ExecKind::Load => entry.load_calls = entry.load_calls.saturating_add(1),
                    ExecKind::Update => entry.update_calls = entry.update_calls.saturating_add(1),
                    ExecKind::Delete => entry.delete_calls = entry.delete_calls.saturating_add(1),
                });
            }

            MetricsEvent::ExecFinish {
                kind,
                collection,
                rows_touched,
                micros,
            } => {
                metrics::with_state_mut(|m| {
                    let ops = &mut m.ops;
                    match kind {
                        ExecKind::Load => ops.rows_loaded = ops.rows_loaded.saturating_add(rows_touched),
                        ExecKind::Create | ExecKind::Update => {
                            ops.rows_written = ops.rows_written.saturating_add(rows_touched);
                        }
                        ExecKind::Delete => {
                            ops.rows_deleted = ops.rows_deleted.saturating_add(rows_touched);
                        }
                    }
                    metrics::add_micros(&mut ops.exec_micros_total, &mut ops.exec_micros_max, micros);
                });
                Self::with_collection(collection, |entry| match kind {
                    ExecKind::Load => {
                        entry.rows_loaded = entry.rows_loaded.saturating_add(rows_touched);
                    }
                    ExecKind::Create | ExecKind::Update => {
                        entry.rows_written = entry.rows_written.saturating_add(rows_touched);
                    }
                    ExecKind::Delete => {
                        entry.rows_deleted = entry.rows_deleted.saturating_add(rows_touched);
                    }
                });
            }

            MetricsEvent::RowsScanned {
                collection,
                rows_scanned,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.rows_scanned = m.ops.rows_scanned.saturating_add(rows_scanned);
                });
                Self::with_collection(collection, |entry| {
                    entry.rows_scanned = entry.rows_scanned.saturating_add(rows_scanned);
                });
            }

            MetricsEvent::IndexDelta {
                collection,
                inserts,
                removes,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.index_inserts = m.ops.index_inserts.saturating_add(inserts);
                    m.ops.index_removes = m.ops.index_removes.saturating_add(removes);
                });
                Self::with_collection(collection, |entry| {
                    entry.index_inserts = entry.index_inserts.saturating_add(inserts);
                    entry.index_removes = entry.index_removes.saturating_add(removes);
                });
            }

            MetricsEvent::DanglingIndex { collection } => {
                metrics::with_state_mut(|m| {
                    m.ops.dangling_index_hits = m.ops.dangling_index_hits.saturating_add(1);
                });
                Self::with_collection(collection, |entry| {
                    entry.dangling_index_hits = entry.dangling_index_hits.saturating_add(1);
                });
            }

            MetricsEvent::Conflict { collection } => {
                metrics::with_state_mut(|m| m.ops.conflicts = m.ops.conflicts.saturating_add(1));
                Self::with_collection(collection, |entry| {
                    entry.conflicts = entry.conflicts.saturating_add(1);
                });
            }
        }
    }
}

/// Snapshot the current global metrics state.
#[must_use]
pub fn metrics_report() -> EventReport {
    metrics::report()
}

/// Reset all global metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

///
/// Span
/// RAII guard that emits start/finish metrics events for one operation.
/// Ensures finish accounting happens even on early return or unwind.
///

pub(crate) struct Span<'a> {
    sink: &'a dyn MetricsSink,
    kind: ExecKind,
    collection: &'static str,
    started: Instant,
    rows: u64,
}

impl<'a> Span<'a> {
    #[must_use]
    pub(crate) fn new(sink: &'a dyn MetricsSink, kind: ExecKind, collection: &'static str) -> Self {
        sink.record(MetricsEvent::ExecStart { kind, collection });

        Self {
            sink,
            kind,
            collection,
            started: Instant::now(),
            rows: 0,
        }
    }

    pub(crate) const fn set_rows(&mut self, rows: u64) {
        self.rows = rows;
    }
}

impl Drop for Span<'_> {
    fn drop(&mut self) {
        let micros = u64::try_from(self.started.elapsed().as_micros()).unwrap_or(u64::MAX);

        self.sink.record(MetricsEvent::ExecFinish {
            kind: self.kind,
            collection: self.collection,
            rows_touched: self.rows,
            micros,
        });
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<MetricsEvent>>);

    impl MetricsSink for RecordingSink {
        fn record(&self, event: MetricsEvent) {
            self.0.lock().push(event);
        }
    }

    #[test]
    fn span_finishes_once_with_rows() {
        let sink = RecordingSink::default();
        {
            let mut span = Span::new(&sink, ExecKind::Load, "span_test");
            span.set_rows(3);
        }

        let events = sink.0.lock();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[1],
            MetricsEvent::ExecFinish {
                kind: ExecKind::Load,
                rows_touched: 3,
                ..
            }
        ));
    }

    #[test]
    fn span_finishes_on_unwind() {
        let sink = RecordingSink::default();
        let result = catch_unwind(AssertUnwindSafe(|| {
            let _span = Span::new(&sink, ExecKind::Delete, "span_unwind_test");
            panic!("boom");
        }));

        assert!(result.is_err());
        assert_eq!(sink.0.lock().len(), 2);
    }

    #[test]
    fn global_sink_accumulates_per_collection() {
        let collection = "global_sink_accumulates_per_collection";
        GlobalMetricsSink.record(MetricsEvent::IndexDelta {
            collection,
            inserts: 2,
            removes: 1,
        });
        GlobalMetricsSink.record(MetricsEvent::Conflict { collection });

        let report = metrics_report();
        let counters = &report.collections[collection];
        assert_eq!(counters.index_inserts, 2);
        assert_eq!(counters.index_removes, 1);
        assert_eq!(counters.conflicts, 1);
    }
}

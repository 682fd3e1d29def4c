//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! This module does not access storage. Record-store code reports through
//! `sink::MetricsEvent`; the default sink folds events into process-wide
//! counters readable via [`metrics_report`].

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{CollectionCounters, EventOps, EventReport};
pub use sink::{ExecKind, GlobalMetricsSink, MetricsEvent, MetricsSink, metrics_report, metrics_reset_all};

pub(crate) use sink::Span;

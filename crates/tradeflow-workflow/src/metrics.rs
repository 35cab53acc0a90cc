//! # Workflow Metrics
//!
//! Lightweight in-process counters using atomics. Cloning shares the
//! counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tradeflow_core::TradeError;

/// Shared metrics state.
#[derive(Debug, Clone, Default)]
pub struct WorkflowMetrics {
    invocations: Arc<AtomicU64>,
    queries: Arc<AtomicU64>,
    denials: Arc<AtomicU64>,
    failures: Arc<AtomicU64>,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub invocations: u64,
    pub queries: u64,
    pub denials: u64,
    pub failures: u64,
}

impl WorkflowMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_invocation(&self) {
        self.invocations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a failed command or query. Access denials are counted separately.
    pub(crate) fn record_error(&self, err: &TradeError) {
        if matches!(err, TradeError::AccessDenied(_)) {
            self.denials.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            invocations: self.invocations.load(Ordering::Relaxed),
            queries: self.queries.load(Ordering::Relaxed),
            denials: self.denials.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

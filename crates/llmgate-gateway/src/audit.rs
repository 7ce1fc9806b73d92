//! Bounded, append-only audit trail.
//!
//! A fixed-capacity FIFO ring of [`AuditEntry`] records: once full, each
//! append evicts the oldest entry. Averages in [`AuditLog::stats`] cover
//! only the retained entries, while the `requests` counter (kept here) and
//! `total_cost` (kept by the cost accountant) span the gateway's lifetime.
//! After eviction begins the lifetime counters and the retained averages
//! describe different windows; that divergence is intentional.

use std::collections::VecDeque;

use llmgate_core::{AuditEntry, GatewayStats};
use tokio::sync::RwLock;

use crate::cost::round_to;

/// Default ring capacity.
pub const AUDIT_CAPACITY: usize = 1000;

struct AuditLogInner {
    entries: VecDeque<AuditEntry>,
    lifetime_requests: u64,
}

/// The bounded audit log.
///
/// Appends are atomic: an entry is either fully recorded (with the lifetime
/// counter bumped) or not recorded at all.
pub struct AuditLog {
    inner: RwLock<AuditLogInner>,
    capacity: usize,
}

impl AuditLog {
    /// Create a log with the default 1000-entry capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(AUDIT_CAPACITY)
    }

    /// Create a log with an explicit capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(AuditLogInner {
                entries: VecDeque::with_capacity(capacity),
                lifetime_requests: 0,
            }),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest when the ring is full.
    pub async fn append(&self, entry: AuditEntry) {
        let mut inner = self.inner.write().await;
        if inner.entries.len() == self.capacity {
            inner.entries.pop_front();
        }
        inner.entries.push_back(entry);
        inner.lifetime_requests += 1;
    }

    /// The most recent `limit` entries, oldest first among those returned.
    pub async fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let inner = self.inner.read().await;
        let skip = inner.entries.len().saturating_sub(limit);
        inner.entries.iter().skip(skip).cloned().collect()
    }

    /// Number of entries currently retained.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// `true` when no entries are retained.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }

    /// Total requests over the gateway's lifetime (not capped by eviction).
    pub async fn lifetime_requests(&self) -> u64 {
        self.inner.read().await.lifetime_requests
    }

    /// Aggregate statistics.
    ///
    /// `lifetime_cost` is supplied by the cost accountant. Returns a
    /// zero-valued aggregate when the log is empty; otherwise averages are
    /// computed over retained entries while `requests`/`total_cost` reflect
    /// the lifetime counters.
    pub async fn stats(&self, lifetime_cost: f64) -> GatewayStats {
        let inner = self.inner.read().await;
        if inner.entries.is_empty() {
            return GatewayStats::default();
        }

        let retained = inner.entries.len() as f64;
        let confidence_sum: f64 = inner.entries.iter().map(|e| e.confidence).sum();
        let time_sum: f64 = inner.entries.iter().map(|e| e.processing_time_ms).sum();
        let requests = inner.lifetime_requests;

        GatewayStats {
            requests,
            total_cost: round_to(lifetime_cost, 4),
            avg_cost_per_request: if requests > 0 {
                round_to(lifetime_cost / requests as f64, 6)
            } else {
                0.0
            },
            avg_confidence: round_to(confidence_sum / retained, 2),
            avg_processing_time_ms: round_to(time_sum / retained, 2),
        }
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

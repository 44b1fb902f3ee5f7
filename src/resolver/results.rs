use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::catalog::{CatalogKind, SiteTarget};

/// A recorded classification for one site
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Handle found in the body of the final page
    Confirmed(SiteTarget),
    /// Page answered 200 without the handle; kept for human review
    Unconfirmed(SiteTarget),
    /// Site answered 403; existence can't be decided automatically
    ManualReview(SiteTarget),
}

/// Why a target left no trace in the result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Transport,
    Timeout,
    NotFound,
    UnrelatedRedirect,
    Status(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Recorded(ProbeOutcome),
    Dropped(DropReason),
}

/// The three buckets of one batch, read after every worker has joined.
///
/// Insertion order follows worker scheduling and carries no meaning.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcomes {
    pub confirmed: Vec<SiteTarget>,
    pub unconfirmed: Vec<SiteTarget>,
    pub manual_review: Vec<SiteTarget>,
}

impl BatchOutcomes {
    pub fn recorded(&self) -> usize {
        self.confirmed.len() + self.unconfirmed.len() + self.manual_review.len()
    }
}

/// Aggregator shared by all workers of one batch.
///
/// Every append goes through the same lock. The network request that leads to
/// an append happens before the lock is taken.
#[derive(Debug, Default)]
pub struct ResultSet {
    buckets: Mutex<BatchOutcomes>,
    dropped: AtomicUsize,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BatchOutcomes> {
        // Recover the buckets from a poisoned lock.
        self.buckets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_confirmed(&self, target: SiteTarget) {
        self.lock().confirmed.push(target);
    }

    pub fn record_unconfirmed(&self, target: SiteTarget) {
        self.lock().unconfirmed.push(target);
    }

    pub fn record_manual_review(&self, target: SiteTarget) {
        self.lock().manual_review.push(target);
    }

    pub fn record(&self, outcome: ProbeOutcome) {
        match outcome {
            ProbeOutcome::Confirmed(target) => self.record_confirmed(target),
            ProbeOutcome::Unconfirmed(target) => self.record_unconfirmed(target),
            ProbeOutcome::ManualReview(target) => self.record_manual_review(target),
        }
    }

    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Takes the buckets out; meant to be called once all workers have joined
    pub fn drain(&self) -> BatchOutcomes {
        std::mem::take(&mut *self.lock())
    }
}

/// Aggregate figures for one finished batch
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub catalog: CatalogKind,
    pub confirmed_count: usize,
    pub elapsed_seconds: f64,
    /// Number of targets in the catalog
    pub probed: usize,
    pub dropped: usize,
    /// Duration of the slowest single request issued in the batch
    pub slowest_probe_seconds: f64,
    pub outcomes: BatchOutcomes,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn target(name: &str) -> SiteTarget {
        SiteTarget {
            name: name.to_string(),
            url: format!("https://{}.test/alice", name),
        }
    }

    #[test]
    fn test_record_routes_to_buckets() {
        let results = ResultSet::new();
        results.record(ProbeOutcome::Confirmed(target("a")));
        results.record(ProbeOutcome::Unconfirmed(target("b")));
        results.record(ProbeOutcome::ManualReview(target("c")));
        results.record_dropped();

        let outcomes = results.drain();
        assert_eq!(outcomes.confirmed, vec![target("a")]);
        assert_eq!(outcomes.unconfirmed, vec![target("b")]);
        assert_eq!(outcomes.manual_review, vec![target("c")]);
        assert_eq!(outcomes.recorded(), 3);
        assert_eq!(results.dropped(), 1);
    }

    #[test]
    fn test_drain_empties_buckets() {
        let results = ResultSet::new();
        results.record_confirmed(target("a"));

        assert_eq!(results.drain().confirmed.len(), 1);
        assert_eq!(results.drain().recorded(), 0);
    }

    #[test]
    fn test_concurrent_appends_are_all_kept() {
        let results = Arc::new(ResultSet::new());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let results = Arc::clone(&results);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        results.record_unconfirmed(target(&format!("{t}-{i}")));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(results.drain().unconfirmed.len(), 800);
    }
}

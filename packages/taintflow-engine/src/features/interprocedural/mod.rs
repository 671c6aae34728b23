//! Bounded call-site summarization
//!
//! A callee with an available body inside the depth/size budget is analyzed
//! recursively, seeded from the caller's argument values; the resulting
//! return/out-parameter values are memoized per (callee, argument-state
//! signature) so recursive and repeated calls stay bounded. A call already
//! on the active recursion stack, like anything unavailable or over budget,
//! summarizes conservatively: return `Unknown`, every out-parameter
//! `Unknown`, no claim of sanitization, no claim of new taint.

use crate::features::lattice::TaintValue;
use crate::shared::models::BodyId;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Abstract effect of one call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSummary {
    pub return_value: TaintValue,
    /// One value per callee parameter position; the caller reads the
    /// positions bound to its `out` arguments
    pub out_values: Vec<TaintValue>,
}

impl CallSummary {
    /// The summary claimed when nothing about the callee can be proven
    pub fn conservative(param_count: usize) -> Self {
        Self {
            return_value: TaintValue::Unknown,
            out_values: vec![TaintValue::Unknown; param_count],
        }
    }

    pub fn out_value(&self, position: usize) -> TaintValue {
        self.out_values
            .get(position)
            .cloned()
            .unwrap_or(TaintValue::Unknown)
    }
}

/// Memoization key: callee identity plus the abstract values of its
/// arguments (the "argument-state signature")
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SummaryKey {
    pub callee: BodyId,
    pub args: Vec<TaintValue>,
}

/// Session-wide LRU summary cache with hit/miss counters
///
/// Shared by reference across concurrently analyzed bodies; the lock is
/// held only for single get/put operations.
#[derive(Debug)]
pub struct SummaryCache {
    cache: Mutex<LruCache<SummaryKey, CallSummary>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl SummaryCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    pub fn get(&self, key: &SummaryKey) -> Option<CallSummary> {
        let result = self.cache.lock().get(key).cloned();
        match result {
            Some(summary) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(summary)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn put(&self, key: SummaryKey, summary: CallSummary) {
        self.cache.lock().put(key, summary);
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn hit_rate(&self) -> f32 {
        let total = self.hits() + self.misses();
        if total == 0 {
            0.0
        } else {
            self.hits() as f32 / total as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::registry::SourceId;
    use std::collections::BTreeSet;

    fn key(body: u32, args: Vec<TaintValue>) -> SummaryKey {
        SummaryKey {
            callee: BodyId(body),
            args,
        }
    }

    #[test]
    fn test_conservative_summary_claims_nothing() {
        let summary = CallSummary::conservative(2);
        assert_eq!(summary.return_value, TaintValue::Unknown);
        assert_eq!(summary.out_value(0), TaintValue::Unknown);
        assert_eq!(summary.out_value(1), TaintValue::Unknown);
        // Out-of-range positions stay conservative too
        assert_eq!(summary.out_value(9), TaintValue::Unknown);
    }

    #[test]
    fn test_cache_round_trip_and_counters() {
        let cache = SummaryCache::new(8);
        let k = key(1, vec![TaintValue::NotTainted]);

        assert!(cache.get(&k).is_none());
        cache.put(k.clone(), CallSummary::conservative(1));
        assert!(cache.get(&k).is_some());

        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
        assert!((cache.hit_rate() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_signature_distinguishes_argument_states() {
        let cache = SummaryCache::new(8);
        let tainted = TaintValue::Tainted(BTreeSet::from([SourceId(0)]));

        cache.put(
            key(1, vec![TaintValue::NotTainted]),
            CallSummary {
                return_value: TaintValue::NotTainted,
                out_values: vec![],
            },
        );
        assert!(cache.get(&key(1, vec![tainted])).is_none());
    }

    #[test]
    fn test_lru_evicts_oldest() {
        let cache = SummaryCache::new(1);
        cache.put(key(1, vec![]), CallSummary::conservative(0));
        cache.put(key(2, vec![]), CallSummary::conservative(0));
        assert!(cache.get(&key(1, vec![])).is_none());
        assert!(cache.get(&key(2, vec![])).is_some());
    }
}

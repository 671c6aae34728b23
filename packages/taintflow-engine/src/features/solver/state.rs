//! Abstract program state at a block boundary
//!
//! A `ProgramState` maps interned entities to lattice values. The map is
//! kept normalized: `Unknown`, the default for any never-observed entity,
//! is never stored, so map equality is exactly "the states agree on every
//! entity reachable from either", and a join only materializes entries that
//! carry information.

use crate::features::entity::EntityId;
use crate::features::lattice::TaintValue;
use rustc_hash::FxHashMap;

/// Immutable-by-convention mapping from entity to abstract value; cloned at
/// block boundaries (copy-on-write is the clone)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramState {
    values: FxHashMap<EntityId, TaintValue>,
}

impl ProgramState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value; `Unknown` when the entity was never observed
    pub fn value_of(&self, entity: EntityId) -> TaintValue {
        self.values
            .get(&entity)
            .cloned()
            .unwrap_or(TaintValue::Unknown)
    }

    /// Assignment replaces the previous value outright; it never merges
    pub fn assign(&mut self, entity: EntityId, value: TaintValue) {
        if value == TaintValue::Unknown {
            self.values.remove(&entity);
        } else {
            self.values.insert(entity, value);
        }
    }

    /// Pointwise lattice join over the union of tracked entities
    pub fn join(&self, other: &ProgramState) -> ProgramState {
        let mut result = FxHashMap::default();
        for (&entity, value) in &self.values {
            let joined = value.join(&other.value_of(entity));
            if joined != TaintValue::Unknown {
                result.insert(entity, joined);
            }
        }
        for (&entity, value) in &other.values {
            if !self.values.contains_key(&entity) {
                // self side is Unknown; join is Unknown unless value is Tainted
                let joined = TaintValue::Unknown.join(value);
                if joined != TaintValue::Unknown {
                    result.insert(entity, joined);
                }
            }
        }
        ProgramState { values: result }
    }

    pub fn tracked_entities(&self) -> impl Iterator<Item = (EntityId, &TaintValue)> + '_ {
        self.values.iter().map(|(&e, v)| (e, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

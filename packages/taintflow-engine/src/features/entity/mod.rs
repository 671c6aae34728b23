//! Canonical identity for trackable storage locations
//!
//! Every local, parameter, field chain, collapsed array/indexer element, and
//! `this` reference observed during analysis is interned once per session
//! into a dense `EntityId`. Equality is structural over the full parent
//! chain, so ids are safe map keys across analysis runs, and hashing a state
//! key is an integer hash rather than a chain walk.

use crate::features::flow_graph::Operand;
use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of a storage location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Local,
    Parameter,
    Field,
    ArrayElement,
    PropertyElement,
    ThisReference,
}

/// Interned entity handle; dense per session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// One storage location: kind + symbol + optional parent chain
///
/// `a.b.c` yields a Field("c") whose parent is Field("b") whose parent is
/// Local("a"). Array and indexer elements collapse all indices of one base
/// into a single representative entity: an array is either "possibly
/// contains taint" or "proven not to".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisEntity {
    pub kind: EntityKind,
    pub symbol: String,
    pub parent: Option<EntityId>,
}

/// Operand shapes that do not denote a trackable storage location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedOperand {
    /// Compile-time constant; reads are proven safe
    Literal,
    /// The `_` discard; writes are an intentional no-op
    Discarded,
    /// Shape the front end could not express; reads are Unknown
    Opaque,
}

impl fmt::Display for UnsupportedOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedOperand::Literal => write!(f, "literal operand"),
            UnsupportedOperand::Discarded => write!(f, "discarded operand"),
            UnsupportedOperand::Opaque => write!(f, "opaque operand"),
        }
    }
}

type EntityKey = (EntityKind, String, Option<EntityId>);

/// Per-session entity interner
///
/// Interning is append-only and safe to share across concurrently analyzed
/// bodies: the id map is a concurrent map, the reverse slab sits behind a
/// read-write lock taken only on insert and on reverse lookup.
#[derive(Debug, Default)]
pub struct EntityInterner {
    ids: DashMap<EntityKey, EntityId>,
    entities: RwLock<Vec<AnalysisEntity>>,
}

impl EntityInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a location, returning its stable id
    pub fn intern(
        &self,
        kind: EntityKind,
        symbol: impl Into<String>,
        parent: Option<EntityId>,
    ) -> EntityId {
        let symbol = symbol.into();
        let key = (kind, symbol.clone(), parent);
        *self.ids.entry(key).or_insert_with(|| {
            let mut entities = self.entities.write();
            let id = EntityId(entities.len() as u32);
            entities.push(AnalysisEntity {
                kind,
                symbol,
                parent,
            });
            id
        })
    }

    /// Resolve an operand reference to an entity id
    ///
    /// Field chains resolve recursively; array/indexer accesses collapse to
    /// the base's representative element entity.
    pub fn resolve(&self, operand: &Operand) -> Result<EntityId, UnsupportedOperand> {
        match operand {
            Operand::Local(name) => Ok(self.intern(EntityKind::Local, name.clone(), None)),
            Operand::Parameter { name, .. } => {
                Ok(self.intern(EntityKind::Parameter, name.clone(), None))
            }
            Operand::ThisReference => Ok(self.intern(EntityKind::ThisReference, "this", None)),
            Operand::Field { base, name } => {
                let parent = self.resolve(base)?;
                Ok(self.intern(EntityKind::Field, name.clone(), Some(parent)))
            }
            Operand::ArrayIndex { base } => {
                let parent = self.resolve(base)?;
                Ok(self.intern(EntityKind::ArrayElement, "[]", Some(parent)))
            }
            Operand::PropertyIndex { base } => {
                let parent = self.resolve(base)?;
                Ok(self.intern(EntityKind::PropertyElement, "[]", Some(parent)))
            }
            Operand::Literal => Err(UnsupportedOperand::Literal),
            Operand::Discarded => Err(UnsupportedOperand::Discarded),
            Operand::Opaque => Err(UnsupportedOperand::Opaque),
        }
    }

    /// Reverse lookup for diagnostics
    pub fn entity(&self, id: EntityId) -> AnalysisEntity {
        self.entities.read()[id.0 as usize].clone()
    }

    /// Render the full chain, e.g. `a.b.[]`
    pub fn describe(&self, id: EntityId) -> String {
        let entity = self.entity(id);
        match entity.parent {
            Some(parent) => format!("{}.{}", self.describe(parent), entity.symbol),
            None => entity.symbol,
        }
    }

    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! Callee body lookup
//!
//! The summarizer resolves `Callee::body` ids through a `BodyProvider`
//! owned by the session. Providers must be shareable across concurrently
//! analyzed bodies.

use super::cfg::ControlFlowGraph;
use crate::shared::models::BodyId;
use rustc_hash::FxHashMap;

/// Supplies CFGs for callees defined in the same compilation
pub trait BodyProvider: Send + Sync {
    fn body(&self, id: BodyId) -> Option<&ControlFlowGraph>;
}

/// Provider with no bodies; every callee summarizes conservatively
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyBodyProvider;

impl BodyProvider for EmptyBodyProvider {
    fn body(&self, _id: BodyId) -> Option<&ControlFlowGraph> {
        None
    }
}

/// Map-backed provider, filled once before analysis starts
#[derive(Debug, Default)]
pub struct InMemoryBodyProvider {
    bodies: FxHashMap<BodyId, ControlFlowGraph>,
}

impl InMemoryBodyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: BodyId, cfg: ControlFlowGraph) {
        self.bodies.insert(id, cfg);
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl BodyProvider for InMemoryBodyProvider {
    fn body(&self, id: BodyId) -> Option<&ControlFlowGraph> {
        self.bodies.get(&id)
    }
}

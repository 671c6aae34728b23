//! Fluent CFG construction for front ends and tests

use super::cfg::{BasicBlock, BlockId, ControlFlowGraph, Edge, EdgeKind, ParameterDecl};
use super::operation::Operation;
use crate::errors::Result;

/// Builder for `ControlFlowGraph`
///
/// The first added block becomes the entry unless overridden.
///
/// ```
/// use taintflow_engine::flow_graph::{CfgBuilder, EdgeKind};
///
/// let mut builder = CfgBuilder::new();
/// let entry = builder.add_block(vec![]);
/// let exit = builder.add_block(vec![]);
/// builder.add_edge(entry, exit, EdgeKind::Regular);
/// let cfg = builder.build().unwrap();
/// assert_eq!(cfg.block_count(), 2);
/// ```
#[derive(Debug, Default)]
pub struct CfgBuilder {
    blocks: Vec<BasicBlock>,
    edges: Vec<Edge>,
    params: Vec<ParameterDecl>,
    entry: Option<BlockId>,
}

impl CfgBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block; returns its id
    pub fn add_block(&mut self, operations: Vec<Operation>) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(BasicBlock { id, operations });
        id
    }

    pub fn add_edge(&mut self, source: BlockId, target: BlockId, kind: EdgeKind) -> &mut Self {
        self.edges.push(Edge {
            source,
            target,
            kind,
        });
        self
    }

    /// Declare a by-value parameter; index is assignment order
    pub fn add_parameter(
        &mut self,
        name: impl Into<String>,
        type_name: impl Into<String>,
    ) -> &mut Self {
        self.push_param(name.into(), type_name.into(), false);
        self
    }

    /// Declare an `out` parameter
    pub fn add_out_parameter(
        &mut self,
        name: impl Into<String>,
        type_name: impl Into<String>,
    ) -> &mut Self {
        self.push_param(name.into(), type_name.into(), true);
        self
    }

    fn push_param(&mut self, name: String, type_name: String, is_out: bool) {
        let index = self.params.len();
        self.params.push(ParameterDecl {
            index,
            name,
            type_name,
            is_out,
        });
    }

    pub fn set_entry(&mut self, entry: BlockId) -> &mut Self {
        self.entry = Some(entry);
        self
    }

    pub fn build(self) -> Result<ControlFlowGraph> {
        let entry = self.entry.unwrap_or(BlockId(0));
        ControlFlowGraph::from_parts(self.blocks, entry, self.params, self.edges)
    }
}

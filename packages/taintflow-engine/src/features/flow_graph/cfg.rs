//! Basic blocks, edges, and graph queries
//!
//! Blocks are stored in front-end order and identified by dense `BlockId`
//! indices. Reverse postorder and loop-header detection are computed once on
//! demand; the fixpoint iterator uses loop headers as its widening points.

use super::operation::Operation;
use crate::errors::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense block index within one CFG
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u32);

impl BlockId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}", self.0)
    }
}

/// Edge classification
///
/// `Exception` edges lead to handler blocks and may fire after any partial
/// effect of the source block; `FinallyEntry` edges enter finally regions
/// and behave like regular edges for state propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    Regular,
    Exception,
    FinallyEntry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: BlockId,
    pub target: BlockId,
    pub kind: EdgeKind,
}

/// One basic block: an ordered run of operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicBlock {
    pub id: BlockId,
    pub operations: Vec<Operation>,
}

/// Parameter declaration of the analyzed body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDecl {
    pub index: usize,
    pub name: String,
    /// Metadata name of the parameter type, used for source classification
    pub type_name: String,
    /// `out`-style parameter written by the body
    pub is_out: bool,
}

/// Control-flow graph of one analyzable body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlFlowGraph {
    blocks: Vec<BasicBlock>,
    entry: BlockId,
    params: Vec<ParameterDecl>,
    successors: Vec<Vec<(BlockId, EdgeKind)>>,
    predecessors: Vec<Vec<(BlockId, EdgeKind)>>,
}

impl ControlFlowGraph {
    /// Assemble a graph from parts; prefer `CfgBuilder` for construction.
    ///
    /// Fails with `InvalidGraph` when the entry or any edge endpoint is out
    /// of range.
    pub fn from_parts(
        blocks: Vec<BasicBlock>,
        entry: BlockId,
        params: Vec<ParameterDecl>,
        edges: Vec<Edge>,
    ) -> Result<Self> {
        let count = blocks.len();
        if entry.index() >= count {
            return Err(EngineError::InvalidGraph(format!(
                "entry block {} out of range ({} blocks)",
                entry, count
            )));
        }

        let mut successors = vec![Vec::new(); count];
        let mut predecessors = vec![Vec::new(); count];
        for edge in &edges {
            if edge.source.index() >= count || edge.target.index() >= count {
                return Err(EngineError::InvalidGraph(format!(
                    "edge {} -> {} references a missing block",
                    edge.source, edge.target
                )));
            }
            successors[edge.source.index()].push((edge.target, edge.kind));
            predecessors[edge.target.index()].push((edge.source, edge.kind));
        }

        Ok(Self {
            blocks,
            entry,
            params,
            successors,
            predecessors,
        })
    }

    pub fn entry(&self) -> BlockId {
        self.entry
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.index()]
    }

    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    pub fn parameters(&self) -> &[ParameterDecl] {
        &self.params
    }

    pub fn successors(&self, id: BlockId) -> &[(BlockId, EdgeKind)] {
        &self.successors[id.index()]
    }

    pub fn predecessors(&self, id: BlockId) -> &[(BlockId, EdgeKind)] {
        &self.predecessors[id.index()]
    }

    /// Blocks with no successors (normal or exceptional exits)
    pub fn exit_blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks
            .iter()
            .filter(|b| self.successors[b.id.index()].is_empty())
            .map(|b| b.id)
    }

    /// Reverse postorder over all edge kinds, entry first.
    ///
    /// Blocks unreachable from the entry are absent.
    pub fn reverse_postorder(&self) -> Vec<BlockId> {
        let count = self.block_count();
        let mut visited = vec![false; count];
        let mut postorder = Vec::with_capacity(count);
        // Iterative DFS; the second stack element tracks the next successor
        let mut stack: Vec<(BlockId, usize)> = vec![(self.entry, 0)];
        visited[self.entry.index()] = true;

        while let Some(&(block, next)) = stack.last() {
            let succs = &self.successors[block.index()];
            if next < succs.len() {
                if let Some(frame) = stack.last_mut() {
                    frame.1 += 1;
                }
                let (target, _) = succs[next];
                if !visited[target.index()] {
                    visited[target.index()] = true;
                    stack.push((target, 0));
                }
            } else {
                postorder.push(block);
                stack.pop();
            }
        }

        postorder.reverse();
        postorder
    }

    /// Loop headers: blocks with a predecessor at an equal or higher
    /// reverse-postorder index (the back-edge sources), self-loops included.
    pub fn loop_headers(&self) -> Vec<BlockId> {
        let rpo = self.reverse_postorder();
        let mut index = vec![usize::MAX; self.block_count()];
        for (i, block) in rpo.iter().enumerate() {
            index[block.index()] = i;
        }

        let mut headers = Vec::new();
        for &block in &rpo {
            let own = index[block.index()];
            let is_header = self
                .predecessors(block)
                .iter()
                .any(|(pred, _)| index[pred.index()] != usize::MAX && index[pred.index()] >= own);
            if is_header {
                headers.push(block);
            }
        }
        headers
    }
}

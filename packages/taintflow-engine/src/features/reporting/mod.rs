//! Findings and analysis output
//!
//! A `Finding` records one tainted value reaching one sink parameter. The
//! collector deduplicates by (sink identity, provenance-set identity), so a
//! value reaching the same sink through several control-flow paths (or
//! re-observed across worklist revisits) is reported once.

use crate::features::flow_graph::BlockId;
use crate::features::registry::{SinkKind, SourceId};
use crate::features::solver::ProgramState;
use crate::shared::models::Span;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One (source provenance set, sink location) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Declaring type of the sink method
    pub sink_type: String,
    /// Sink method name
    pub sink_method: String,
    /// Vulnerability class declared by the sink registry
    pub sink_kind: SinkKind,
    /// Which argument position received the tainted value
    pub argument_index: usize,
    /// Call-site location
    pub span: Span,
    /// Every source the value may have originated from
    pub provenance: BTreeSet<SourceId>,
    /// Display names for the provenance set, resolved at emission
    pub source_names: Vec<String>,
}

impl Finding {
    /// JSON form for rule layers that ship findings across a process
    /// boundary
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FindingKey {
    sink_type: String,
    sink_method: String,
    argument_index: usize,
    span: Span,
    provenance: BTreeSet<SourceId>,
}

/// Deduplicating finding sink
#[derive(Debug, Default)]
pub struct FindingCollector {
    seen: FxHashSet<FindingKey>,
    findings: Vec<Finding>,
}

impl FindingCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finding unless an identical (sink, provenance) pair was
    /// already seen
    pub fn emit(&mut self, finding: Finding) {
        let key = FindingKey {
            sink_type: finding.sink_type.clone(),
            sink_method: finding.sink_method.clone(),
            argument_index: finding.argument_index,
            span: finding.span,
            provenance: finding.provenance.clone(),
        };
        if self.seen.insert(key) {
            self.findings.push(finding);
        }
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }
}

/// Per-block entry/exit states at the fixed point
#[derive(Debug, Clone, Default)]
pub struct BlockStates {
    entry: Vec<ProgramState>,
    exit: Vec<ProgramState>,
}

impl BlockStates {
    pub fn with_block_count(count: usize) -> Self {
        Self {
            entry: vec![ProgramState::new(); count],
            exit: vec![ProgramState::new(); count],
        }
    }

    pub fn entry_state(&self, block: BlockId) -> &ProgramState {
        &self.entry[block.index()]
    }

    pub fn exit_state(&self, block: BlockId) -> &ProgramState {
        &self.exit[block.index()]
    }

    pub fn set_entry(&mut self, block: BlockId, state: ProgramState) {
        self.entry[block.index()] = state;
    }

    pub fn set_exit(&mut self, block: BlockId, state: ProgramState) {
        self.exit[block.index()] = state;
    }

    pub fn block_count(&self) -> usize {
        self.entry.len()
    }
}

/// Counters describing one body's analysis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStats {
    /// Worklist pops
    pub iterations: usize,
    /// Distinct blocks processed at least once
    pub blocks_processed: usize,
    /// Entity values forced to Unknown by widening
    pub widenings: usize,
    /// Nested summary runs performed for this body
    pub summary_runs: usize,
    /// True when the worklist hit the safety iteration cap
    pub iteration_cap_hit: bool,
}

/// Everything `analyze` produces for one body
#[derive(Debug)]
pub struct AnalysisOutcome {
    /// Deduplicated findings; a finite, restartable sequence
    pub findings: Vec<Finding>,
    /// Fixed-point states, queryable per block for the consumption rule
    pub states: BlockStates,
    pub stats: AnalysisStats,
}

impl AnalysisOutcome {
    /// Iterate findings without consuming the outcome (restartable)
    pub fn findings(&self) -> impl Iterator<Item = &Finding> + '_ {
        self.findings.iter()
    }
}

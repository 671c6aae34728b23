/*
 * Taintflow Engine - Dataflow/Taint Propagation Core
 *
 * Forward abstract interpretation over a control-flow graph:
 * - Height-3 taint lattice (NotTainted ⊑ Unknown ⊑ Tainted) with widening
 * - Per-operation transfer functions driven by declarative
 *   source/sanitizer/sink registries
 * - Worklist fixpoint iterator with loop-header widening and cooperative
 *   cancellation
 * - Bounded, memoized interprocedural summarization with cycle-breaking
 * - Deduplicated findings plus per-block fixed-point states for the rule
 *   layer
 *
 * The front end supplies the CFG and type/attribute metadata; rule
 * analyzers consume the findings and states. Many bodies may be analyzed
 * concurrently against one immutable session.
 */

pub mod config;
pub mod errors;
pub mod session;
pub mod shared;

mod features;

// Feature slices, re-exported flat
pub use features::entity;
pub use features::flow_graph;
pub use features::interprocedural;
pub use features::lattice;
pub use features::registry;
pub use features::reporting;
pub use features::solver;
pub use features::transfer;

// Primary interface
pub use config::{EngineConfig, Preset};
pub use errors::{EngineError, Result};
pub use features::entity::{AnalysisEntity, EntityId, EntityInterner, EntityKind};
pub use features::flow_graph::{
    Argument, ArgumentKind, BasicBlock, BlockId, BodyProvider, Callee, CfgBuilder,
    ControlFlowGraph, EdgeKind, EmptyBodyProvider, InMemoryBodyProvider, Operand, Operation,
};
pub use features::lattice::TaintValue;
pub use features::registry::{
    build_registries, AttributeArgument, AttributeRow, CompilationTypes, MustUseInfo, Registries,
    RegistryBuilder, SanitizerInfo, SanitizingEffect, SinkInfo, SinkKind, SourceId, SourceInfo,
    SourceKind,
};
pub use features::reporting::{AnalysisOutcome, AnalysisStats, BlockStates, Finding};
pub use features::solver::{CancellationToken, ProgramState};
pub use session::{analyze, AnalysisSession};
pub use shared::models::{BodyId, Span};

//! Control-flow-graph input model
//!
//! The front end lowers each analyzable body to a `ControlFlowGraph`:
//! ordered basic blocks of operations, plus successor edges tagged with an
//! `EdgeKind`. Property reads that may be classified as taint sources are
//! expected to arrive lowered to getter invocations, the way an operation
//! tree lowers property references, so classification stays a plain
//! (type, member) lookup.

mod builder;
mod cfg;
mod operation;
mod provider;

pub use builder::CfgBuilder;
pub use cfg::{BasicBlock, BlockId, ControlFlowGraph, Edge, EdgeKind, ParameterDecl};
pub use operation::{Argument, ArgumentKind, Callee, Operand, Operation};
pub use provider::{BodyProvider, EmptyBodyProvider, InMemoryBodyProvider};

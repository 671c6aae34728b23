//! Fixed-point dataflow solver
//!
//! `state` holds the per-block abstract state, `cancellation` the
//! cooperative stop signal, and `fixpoint` the worklist iterator that
//! drives the transfer functions to stabilization.

mod cancellation;
mod fixpoint;
mod state;

pub use cancellation::CancellationToken;
pub use fixpoint::{solve_body, BodySolution};
pub use state::ProgramState;

//! Worklist fixpoint iteration
//!
//! Forward may-analysis over one CFG: a block's entry state is the join of
//! its predecessors' contributions, its exit state the entry state pushed
//! through the block's transfer functions. Blocks whose exit changed push
//! their successors; the worklist drains when every block is stable.
//!
//! Termination: the lattice has height 3, transfer functions are monotone,
//! and loop headers widen still-growing provenance sets to `Unknown` after
//! `widening_threshold` joins. Widened entities stay widened at that block
//! so the forced value cannot oscillate. A `worklist_max_iterations` safety
//! valve backstops all of it.
//!
//! Predecessor contributions follow the edge kind: regular and
//! finally-entry edges contribute the predecessor's exit state; exception
//! edges contribute the join of the predecessor's entry and exit states,
//! because the throw may occur after any partial effect of the block.

use super::cancellation::CancellationToken;
use super::state::ProgramState;
use crate::errors::{EngineError, Result};
use crate::features::entity::{EntityId, EntityKind};
use crate::features::flow_graph::{Callee, ControlFlowGraph, EdgeKind};
use crate::features::interprocedural::{CallSummary, SummaryKey};
use crate::features::lattice::TaintValue;
use crate::features::reporting::{AnalysisStats, BlockStates, FindingCollector};
use crate::features::transfer::{CallSummarizer, TransferContext};
use crate::session::AnalysisSession;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Fixed-point result for one body
#[derive(Debug)]
pub struct BodySolution {
    pub states: BlockStates,
    pub findings: FindingCollector,
    /// Join of every `Return` value observed
    pub return_value: TaintValue,
    /// Join of the exit states of all exit blocks
    pub exit_state: ProgramState,
    pub stats: AnalysisStats,
}

/// Summarizer backed by nested fixpoint runs
///
/// `active` is the recursion guard: a (callee, argument-signature) pair
/// already being summarized further up the stack is answered conservatively
/// to break the cycle.
struct RunSummarizer<'a, 'g> {
    session: &'a AnalysisSession,
    cancel: &'a CancellationToken,
    depth: u32,
    active: &'g mut FxHashSet<SummaryKey>,
    summary_runs: usize,
}

impl CallSummarizer for RunSummarizer<'_, '_> {
    fn summarize(&mut self, callee: &Callee, args: &[TaintValue]) -> CallSummary {
        let conservative = CallSummary::conservative(args.len());

        let Some(body) = callee.body else {
            return conservative;
        };
        let Some(cfg) = self.session.provider().body(body) else {
            return conservative;
        };

        let config = self.session.config();
        if self.depth >= config.max_summary_depth {
            debug!(%body, depth = self.depth, "summary depth budget exhausted");
            return conservative;
        }
        if cfg.block_count() > config.max_summary_blocks {
            debug!(%body, blocks = cfg.block_count(), "callee over size budget");
            return conservative;
        }

        let key = SummaryKey {
            callee: body,
            args: args.to_vec(),
        };
        if self.active.contains(&key) {
            // Recursive or mutually recursive call: break the cycle
            return conservative;
        }
        if let Some(cached) = self.session.summaries().get(&key) {
            return cached;
        }

        self.active.insert(key.clone());
        let solution = solve_seeded(
            cfg,
            self.session,
            self.cancel,
            Some(args),
            self.depth + 1,
            self.active,
        );
        self.active.remove(&key);
        self.summary_runs += 1;

        match solution {
            Ok(solution) => {
                let out_values = cfg
                    .parameters()
                    .iter()
                    .map(|param| {
                        let entity = self.session.interner().intern(
                            EntityKind::Parameter,
                            param.name.clone(),
                            None,
                        );
                        solution.exit_state.value_of(entity)
                    })
                    .collect();
                let summary = CallSummary {
                    return_value: solution.return_value,
                    out_values,
                };
                self.session.summaries().put(key, summary.clone());
                summary
            }
            // Cancelled mid-summary; the caller's own between-block check
            // stops the outer run right after
            Err(_) => conservative,
        }
    }
}

/// Solve one body to its fixed point
pub fn solve_body(
    cfg: &ControlFlowGraph,
    session: &AnalysisSession,
    cancel: &CancellationToken,
) -> Result<BodySolution> {
    let mut active = FxHashSet::default();
    solve_seeded(cfg, session, cancel, None, 0, &mut active)
}

/// Initial entry state: every parameter `Unknown` (or the caller-provided
/// seed for nested summary runs), except parameters classified as sources,
/// which start tainted
fn initial_state(
    cfg: &ControlFlowGraph,
    session: &AnalysisSession,
    seed_args: Option<&[TaintValue]>,
) -> ProgramState {
    let mut state = ProgramState::new();
    for param in cfg.parameters() {
        let mut value = seed_args
            .and_then(|seed| seed.get(param.index).cloned())
            .unwrap_or(TaintValue::Unknown);
        if let Some(source) = session
            .registries()
            .classify_parameter_source(&param.type_name)
        {
            value = value.join(&TaintValue::tainted_from(source));
        }
        let entity =
            session
                .interner()
                .intern(EntityKind::Parameter, param.name.clone(), None);
        state.assign(entity, value);
    }
    state
}

fn solve_seeded(
    cfg: &ControlFlowGraph,
    session: &AnalysisSession,
    cancel: &CancellationToken,
    seed_args: Option<&[TaintValue]>,
    depth: u32,
    active: &mut FxHashSet<SummaryKey>,
) -> Result<BodySolution> {
    let config = session.config();
    let block_count = cfg.block_count();
    let entry_block = cfg.entry();
    let initial = initial_state(cfg, session, seed_args);

    let loop_headers: FxHashSet<_> = cfg.loop_headers().into_iter().collect();
    let mut states = BlockStates::with_block_count(block_count);
    let mut visited = vec![false; block_count];
    let mut join_counts = vec![0u32; block_count];
    let mut widened: Vec<FxHashSet<EntityId>> = vec![FxHashSet::default(); block_count];

    let ctx = TransferContext::new(session.registries(), session.interner());
    let mut summarizer = RunSummarizer {
        session,
        cancel,
        depth,
        active,
        summary_runs: 0,
    };
    let mut findings = FindingCollector::new();
    let mut return_value = TaintValue::NotTainted;
    let mut stats = AnalysisStats::default();

    let mut worklist = VecDeque::from([entry_block]);

    while let Some(block_id) = worklist.pop_front() {
        // Cooperative cancellation, checked between blocks only
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }

        stats.iterations += 1;
        if stats.iterations > config.worklist_max_iterations {
            warn!(
                max = config.worklist_max_iterations,
                "worklist exceeded iteration cap; accepting current approximation"
            );
            stats.iteration_cap_hit = true;
            break;
        }

        let index = block_id.index();

        // Entry state: join of contributions from already-visited
        // predecessors (plus the initial state at the entry block)
        let mut acc: Option<ProgramState> = if block_id == entry_block {
            Some(initial.clone())
        } else {
            None
        };
        for &(pred, kind) in cfg.predecessors(block_id) {
            if !visited[pred.index()] {
                continue;
            }
            let contribution = match kind {
                EdgeKind::Regular | EdgeKind::FinallyEntry => states.exit_state(pred).clone(),
                EdgeKind::Exception => states.entry_state(pred).join(states.exit_state(pred)),
            };
            acc = Some(match acc {
                Some(state) => state.join(&contribution),
                None => contribution,
            });
        }
        let mut entry = acc.unwrap_or_default();

        // Widening at loop headers: entities whose provenance is still
        // growing past the threshold are forced to Unknown, permanently
        // for this block
        if loop_headers.contains(&block_id) {
            join_counts[index] += 1;
            if join_counts[index] >= config.widening_threshold {
                let previous = states.entry_state(block_id);
                let growing: Vec<_> = entry
                    .tracked_entities()
                    .filter(|(entity, value)| {
                        value.is_tainted() && previous.value_of(*entity) != **value
                    })
                    .map(|(entity, _)| entity)
                    .collect();
                stats.widenings += growing.len();
                widened[index].extend(growing);
            }
            for &entity in &widened[index] {
                entry.assign(entity, TaintValue::Unknown);
            }
        }

        let exit = ctx.apply_block(
            &entry,
            cfg.block(block_id),
            &mut summarizer,
            &mut findings,
            &mut return_value,
        );

        // First visit always counts as changed so every reachable block
        // is processed and propagates to its successors
        let changed = !visited[index] || exit != *states.exit_state(block_id);
        if !visited[index] {
            visited[index] = true;
            stats.blocks_processed += 1;
        }
        states.set_entry(block_id, entry);

        if changed {
            states.set_exit(block_id, exit);
            for &(successor, _) in cfg.successors(block_id) {
                if !worklist.contains(&successor) {
                    worklist.push_back(successor);
                }
            }
        }
    }

    stats.summary_runs = summarizer.summary_runs;

    // Exit state: join over all exit blocks, used for out-parameter
    // summaries
    let mut exit_state: Option<ProgramState> = None;
    for block_id in cfg.exit_blocks() {
        if !visited[block_id.index()] {
            continue;
        }
        let state = states.exit_state(block_id).clone();
        exit_state = Some(match exit_state {
            Some(acc) => acc.join(&state),
            None => state,
        });
    }

    debug!(
        iterations = stats.iterations,
        blocks = stats.blocks_processed,
        widenings = stats.widenings,
        findings = findings.len(),
        "fixpoint reached"
    );

    Ok(BodySolution {
        states,
        findings,
        return_value,
        exit_state: exit_state.unwrap_or_default(),
        stats,
    })
}

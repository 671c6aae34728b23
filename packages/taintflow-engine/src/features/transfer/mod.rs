//! Per-operation transfer functions
//!
//! Each operation kind maps a pre-state to a post-state, consulting the
//! classification registries and emitting findings at sink call sites.
//! Classification order at a call: the sink check always runs against the
//! pre-call argument values, then constructor-sanitizing / source /
//! sanitizer decide the produced values, and anything left unclassified is
//! handed to the interprocedural summarizer.

use crate::features::entity::{EntityInterner, UnsupportedOperand};
use crate::features::flow_graph::{Argument, ArgumentKind, BasicBlock, Callee, Operand, Operation};
use crate::features::interprocedural::CallSummary;
use crate::features::lattice::TaintValue;
use crate::features::registry::Registries;
use crate::features::reporting::{Finding, FindingCollector};
use crate::features::solver::ProgramState;
use crate::shared::models::Span;
use tracing::trace;

/// Callback into the interprocedural layer for unclassified calls
pub trait CallSummarizer {
    fn summarize(&mut self, callee: &Callee, args: &[TaintValue]) -> CallSummary;
}

/// Summarizer that claims nothing; every call is conservative
#[derive(Debug, Default, Clone, Copy)]
pub struct ConservativeSummarizer;

impl CallSummarizer for ConservativeSummarizer {
    fn summarize(&mut self, _callee: &Callee, args: &[TaintValue]) -> CallSummary {
        CallSummary::conservative(args.len())
    }
}

/// Read-only collaborators shared by all transfer functions
pub struct TransferContext<'a> {
    pub registries: &'a Registries,
    pub interner: &'a EntityInterner,
}

impl<'a> TransferContext<'a> {
    pub fn new(registries: &'a Registries, interner: &'a EntityInterner) -> Self {
        Self {
            registries,
            interner,
        }
    }

    /// Abstract value of an operand under the given state
    ///
    /// Literals are proven safe; discarded and opaque shapes read as
    /// `Unknown` rather than failing the block.
    pub fn operand_value(&self, state: &ProgramState, operand: &Operand) -> TaintValue {
        match self.interner.resolve(operand) {
            Ok(entity) => state.value_of(entity),
            Err(UnsupportedOperand::Literal) => TaintValue::NotTainted,
            Err(UnsupportedOperand::Discarded) | Err(UnsupportedOperand::Opaque) => {
                TaintValue::Unknown
            }
        }
    }

    fn assign_operand(&self, state: &mut ProgramState, target: &Operand, value: TaintValue) {
        match self.interner.resolve(target) {
            Ok(entity) => state.assign(entity, value),
            // Writes to literals are impossible, to discards intentional,
            // to opaque shapes untrackable; all are no-ops
            Err(_) => {}
        }
    }

    fn emit_sink_findings(
        &self,
        callee: &Callee,
        arg_values: &[TaintValue],
        span: Span,
        findings: &mut FindingCollector,
    ) {
        let Some(sink) = self
            .registries
            .classify_sink(&callee.type_name, &callee.method_name)
        else {
            return;
        };

        for position in 0..arg_values.len() {
            if !sink.is_vulnerable(position) {
                continue;
            }
            if let TaintValue::Tainted(sources) = &arg_values[position] {
                let source_names = sources
                    .iter()
                    .map(|&id| self.registries.source_info(id).display_name())
                    .collect();
                trace!(
                    sink = %callee.method_name,
                    position,
                    "tainted value reaches sink"
                );
                findings.emit(Finding {
                    sink_type: sink.type_name.clone(),
                    sink_method: sink.method.clone(),
                    sink_kind: sink.kind,
                    argument_index: position,
                    span,
                    provenance: sources.clone(),
                    source_names,
                });
            }
        }
    }

    fn apply_invoke(
        &self,
        state: &mut ProgramState,
        callee: &Callee,
        args: &[Argument],
        result: Option<&Operand>,
        span: Span,
        summarizer: &mut dyn CallSummarizer,
        findings: &mut FindingCollector,
    ) {
        let arg_values: Vec<TaintValue> = args
            .iter()
            .map(|arg| self.operand_value(state, &arg.value))
            .collect();

        // Sink check runs against pre-call values regardless of how the
        // call is otherwise classified
        self.emit_sink_findings(callee, &arg_values, span, findings);

        let result_value;
        if callee.is_constructor && self.registries.classify_constructor(&callee.type_name) {
            result_value = TaintValue::NotTainted;
        } else if let Some(source) = self
            .registries
            .classify_source(&callee.type_name, &callee.method_name)
        {
            result_value = TaintValue::tainted_from(source.id);
        } else if let Some(effect) = self
            .registries
            .classify_sanitizer(&callee.type_name, &callee.method_name)
        {
            // Designated argument entities are forced not-tainted in
            // place, overriding any prior taint
            for &position in &effect.sanitized_arguments {
                if let Some(arg) = args.get(position) {
                    self.assign_operand(state, &arg.value, TaintValue::NotTainted);
                }
            }
            result_value = if effect.sanitizes_return {
                TaintValue::NotTainted
            } else {
                TaintValue::Unknown
            };
        } else {
            let summary = summarizer.summarize(callee, &arg_values);
            for (position, arg) in args.iter().enumerate() {
                if arg.kind == ArgumentKind::Out {
                    self.assign_operand(state, &arg.value, summary.out_value(position));
                }
            }
            result_value = summary.return_value;
        }

        if let Some(target) = result {
            self.assign_operand(state, target, result_value);
        }
    }

    /// Apply one operation; `return_value` accumulates the joined value of
    /// every `Return` seen so far
    pub fn apply_operation(
        &self,
        state: &mut ProgramState,
        operation: &Operation,
        summarizer: &mut dyn CallSummarizer,
        findings: &mut FindingCollector,
        return_value: &mut TaintValue,
    ) {
        match operation {
            Operation::Assign { target, value, .. } => {
                let assigned = self.operand_value(state, value);
                self.assign_operand(state, target, assigned);
            }
            Operation::Invoke {
                callee,
                args,
                result,
                span,
                ..
            } => {
                self.apply_invoke(
                    state,
                    callee,
                    args,
                    result.as_ref(),
                    *span,
                    summarizer,
                    findings,
                );
            }
            // Purely an edge-splitting construct; the iterator consumes
            // the edges
            Operation::Branch { .. } => {}
            Operation::Return { value, .. } => {
                let returned = match value {
                    Some(operand) => self.operand_value(state, operand),
                    None => TaintValue::NotTainted,
                };
                *return_value = return_value.join(&returned);
            }
            // Recognized intentional no-op: neither propagates taint nor
            // produces consumption findings
            Operation::Discard { .. } => {}
        }
    }

    /// Run a block's operations in order over a copy of its entry state
    pub fn apply_block(
        &self,
        entry: &ProgramState,
        block: &BasicBlock,
        summarizer: &mut dyn CallSummarizer,
        findings: &mut FindingCollector,
        return_value: &mut TaintValue,
    ) -> ProgramState {
        let mut state = entry.clone();
        for operation in &block.operations {
            self.apply_operation(&mut state, operation, summarizer, findings, return_value);
        }
        state
    }
}

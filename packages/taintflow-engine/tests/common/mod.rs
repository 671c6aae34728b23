//! Shared fixtures for integration tests

use std::sync::Arc;
use taintflow_engine::{
    AnalysisSession, Argument, BodyId, Callee, CancellationToken, ControlFlowGraph, EngineConfig,
    InMemoryBodyProvider, Operand, Operation, Registries, RegistryBuilder, SinkKind, SourceKind,
    Span,
};

/// Rules used across the scenarios:
/// - `App.Input::read` is a source
/// - `App.Db::exec` is a sink (first parameter)
/// - `App.Clean::sanitize` is a sanitizer
/// - `App.Parser::try_read` must-use out value
pub fn scenario_registries() -> Registries {
    let mut builder = RegistryBuilder::new();
    builder
        .add_source("App.Input", "read", SourceKind::Method)
        .add_sink("App.Db", "exec", SinkKind::Sql, vec![0])
        .add_sanitizer("App.Clean", false, false, &["sanitize"])
        .add_must_use("App.Parser", "try_read", None);
    builder.build()
}

pub fn scenario_session() -> AnalysisSession {
    AnalysisSession::with_registries(scenario_registries(), EngineConfig::default()).unwrap()
}

pub fn session_with_bodies(provider: InMemoryBodyProvider, config: EngineConfig) -> AnalysisSession {
    AnalysisSession::new(
        Arc::new(scenario_registries()),
        config,
        Arc::new(provider),
    )
    .unwrap()
}

pub fn read_into(target: &str) -> Operation {
    Operation::Invoke {
        callee: Callee::external("App.Input", "read"),
        receiver: None,
        args: vec![],
        result: Some(Operand::local(target)),
        span: Span::zero(),
    }
}

pub fn exec_of(arg: &str) -> Operation {
    Operation::Invoke {
        callee: Callee::external("App.Db", "exec"),
        receiver: None,
        args: vec![Argument::by_value(Operand::local(arg))],
        result: None,
        span: Span::zero(),
    }
}

pub fn sanitize_into(target: &str, arg: &str) -> Operation {
    Operation::Invoke {
        callee: Callee::external("App.Clean", "sanitize"),
        receiver: None,
        args: vec![Argument::by_value(Operand::local(arg))],
        result: Some(Operand::local(target)),
        span: Span::zero(),
    }
}

pub fn assign(target: &str, value: Operand) -> Operation {
    Operation::Assign {
        target: Operand::local(target),
        value,
        span: Span::zero(),
    }
}

pub fn call_body(
    type_name: &str,
    method: &str,
    body: BodyId,
    args: Vec<Argument>,
    result: Option<Operand>,
) -> Operation {
    Operation::Invoke {
        callee: Callee::external(type_name, method).with_body(body),
        receiver: None,
        args,
        result,
        span: Span::zero(),
    }
}

pub fn analyze_ok(
    session: &AnalysisSession,
    cfg: &ControlFlowGraph,
) -> taintflow_engine::AnalysisOutcome {
    session.analyze(cfg, &CancellationToken::new()).unwrap()
}

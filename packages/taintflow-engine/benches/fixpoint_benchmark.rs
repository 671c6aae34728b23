/// Fixpoint solver benchmarks
///
/// Measures:
/// - Straight-line propagation over long block chains
/// - Loop convergence with widening
/// - Parallel multi-body throughput against one shared session
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use taintflow_engine::{
    AnalysisSession, Argument, Callee, CancellationToken, CfgBuilder, ControlFlowGraph, EdgeKind,
    EngineConfig, Operand, Operation, RegistryBuilder, SinkKind, SourceKind, Span,
};

fn bench_registries() -> taintflow_engine::Registries {
    let mut builder = RegistryBuilder::new();
    builder
        .add_source("Bench.Input", "read", SourceKind::Method)
        .add_sink("Bench.Db", "exec", SinkKind::Sql, vec![0]);
    builder.build()
}

fn read_call(target: &str) -> Operation {
    Operation::Invoke {
        callee: Callee::external("Bench.Input", "read"),
        receiver: None,
        args: vec![],
        result: Some(Operand::local(target)),
        span: Span::zero(),
    }
}

fn exec_call(arg: &str) -> Operation {
    Operation::Invoke {
        callee: Callee::external("Bench.Db", "exec"),
        receiver: None,
        args: vec![Argument::by_value(Operand::local(arg))],
        result: None,
        span: Span::zero(),
    }
}

/// Chain of `length` blocks, each copying the tainted value forward
fn chain_cfg(length: usize) -> ControlFlowGraph {
    let mut builder = CfgBuilder::new();
    let mut prev = builder.add_block(vec![read_call("v0")]);
    for i in 1..length {
        let block = builder.add_block(vec![Operation::Assign {
            target: Operand::local(format!("v{}", i)),
            value: Operand::local(format!("v{}", i - 1)),
            span: Span::zero(),
        }]);
        builder.add_edge(prev, block, EdgeKind::Regular);
        prev = block;
    }
    let sink = builder.add_block(vec![exec_call(&format!("v{}", length - 1))]);
    builder.add_edge(prev, sink, EdgeKind::Regular);
    builder.build().unwrap()
}

/// Nest of `depth` loops re-tainting the same variable
fn loop_cfg(depth: usize) -> ControlFlowGraph {
    let mut builder = CfgBuilder::new();
    let entry = builder.add_block(vec![read_call("x")]);
    let mut prev = entry;
    for _ in 0..depth {
        let header = builder.add_block(vec![]);
        let body = builder.add_block(vec![read_call("x")]);
        builder.add_edge(prev, header, EdgeKind::Regular);
        builder.add_edge(header, body, EdgeKind::Regular);
        builder.add_edge(body, header, EdgeKind::Regular);
        prev = header;
    }
    let sink = builder.add_block(vec![exec_call("x")]);
    builder.add_edge(prev, sink, EdgeKind::Regular);
    builder.build().unwrap()
}

fn bench_straight_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("straight_line");
    for length in [16usize, 64, 256] {
        let cfg = chain_cfg(length);
        group.bench_with_input(BenchmarkId::from_parameter(length), &cfg, |b, cfg| {
            let session =
                AnalysisSession::with_registries(bench_registries(), EngineConfig::default())
                    .unwrap();
            let cancel = CancellationToken::new();
            b.iter(|| black_box(session.analyze(cfg, &cancel).unwrap()));
        });
    }
    group.finish();
}

fn bench_loops(c: &mut Criterion) {
    let mut group = c.benchmark_group("loop_convergence");
    for depth in [1usize, 4, 16] {
        let cfg = loop_cfg(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &cfg, |b, cfg| {
            let session =
                AnalysisSession::with_registries(bench_registries(), EngineConfig::default())
                    .unwrap();
            let cancel = CancellationToken::new();
            b.iter(|| black_box(session.analyze(cfg, &cancel).unwrap()));
        });
    }
    group.finish();
}

fn bench_parallel_bodies(c: &mut Criterion) {
    let cfg = chain_cfg(32);
    let bodies: Vec<&ControlFlowGraph> = std::iter::repeat(&cfg).take(64).collect();

    c.bench_function("parallel_64_bodies", |b| {
        let session =
            AnalysisSession::with_registries(bench_registries(), EngineConfig::default()).unwrap();
        let cancel = CancellationToken::new();
        b.iter(|| black_box(session.analyze_all(&bodies, &cancel)));
    });
}

criterion_group!(
    benches,
    bench_straight_line,
    bench_loops,
    bench_parallel_bodies
);
criterion_main!(benches);

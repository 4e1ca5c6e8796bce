//! Benchmarks for dependency-graph construction.
//!
//! Run with: cargo bench -p lattice-engine

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

use lattice_core::{names, Target, TargetKind, ValueProperties, ValueRequirement};
use lattice_engine::{
    DeclaredFunction, DefaultFunctionResolver, FixedMarketDataAvailability, GraphBuilder,
    InMemoryFunctionCatalog,
};
use lattice_traits::config::{BuildOptions, QueueStrategy};
use lattice_traits::exclusion::NoExclusions;

// =============================================================================
// TEST DATA GENERATORS
// =============================================================================

/// A chain: V0 <- V1 <- ... <- V{depth-1}.
fn chain_catalog(depth: usize) -> InMemoryFunctionCatalog {
    let mut catalog = InMemoryFunctionCatalog::new();
    for i in 0..depth {
        let mut function = DeclaredFunction::new(format!("Fn{:03}", i), TargetKind::Security)
            .producing(format!("V{}", i), ValueProperties::none());
        if i + 1 < depth {
            function = function.requiring(format!("V{}", i + 1), ValueProperties::none());
        }
        catalog.register(Arc::new(function));
    }
    catalog
}

/// Per-security pricing with a per-security curve, two nodes a security.
fn fanout_catalog() -> InMemoryFunctionCatalog {
    let mut catalog = InMemoryFunctionCatalog::new();
    catalog.register(Arc::new(
        DeclaredFunction::new("PvFn", TargetKind::Security)
            .producing(names::PRESENT_VALUE, ValueProperties::none())
            .requiring(names::DISCOUNT_CURVE, ValueProperties::none()),
    ));
    catalog.register(Arc::new(
        DeclaredFunction::new("CurveFn", TargetKind::Security)
            .producing(names::DISCOUNT_CURVE, ValueProperties::none()),
    ));
    catalog
}

fn build(catalog: InMemoryFunctionCatalog, requirements: Vec<ValueRequirement>, workers: usize) {
    let mut builder = GraphBuilder::new(
        "Bench",
        Arc::new(DefaultFunctionResolver::new(Arc::new(catalog))),
        Arc::new(FixedMarketDataAvailability::empty()),
        Arc::new(NoExclusions),
    )
    .with_options(BuildOptions {
        max_workers: workers,
        queue: QueueStrategy::ConcurrentQueue,
        ..BuildOptions::default()
    });
    builder.add_targets(requirements);
    let compiled = builder.build().expect("bench build");
    assert!(compiled.node_count() > 0);
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_chain_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_resolution");
    for depth in [10usize, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter(|| {
                build(
                    chain_catalog(depth),
                    vec![ValueRequirement::new("V0", Target::security("42"))],
                    2,
                )
            });
        });
    }
    group.finish();
}

fn bench_portfolio_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("portfolio_fanout");
    for securities in [10usize, 100] {
        group.bench_with_input(
            BenchmarkId::from_parameter(securities),
            &securities,
            |b, &securities| {
                b.iter(|| {
                    let requirements: Vec<ValueRequirement> = (0..securities)
                        .map(|i| {
                            ValueRequirement::new(
                                names::PRESENT_VALUE,
                                Target::security(format!("S{}", i)),
                            )
                        })
                        .collect();
                    build(fanout_catalog(), requirements, 4)
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_chain_resolution, bench_portfolio_fanout);
criterion_main!(benches);

//! Property-based tests for graph-construction invariants.
//!
//! These verify the properties that must hold for every catalog:
//! - compiled graphs are acyclic (a topological order exists and every
//!   input is produced before its consumer)
//! - every value resolves to exactly one node (dedup)
//! - graph content does not depend on the run-queue strategy or the worker
//!   count, including when some requirements are unsatisfiable or cyclic

mod common;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use proptest::prelude::*;

use lattice_core::ValueRequirement;
use lattice_engine::{CompiledGraph, DependencyNode, InMemoryFunctionCatalog};
use lattice_traits::config::{BuildOptions, QueueStrategy};

use common::{builder, req, security};

/// Catalog where function `i` produces `V{i}` and requires the values at
/// `deps[i]`, all on the same security target.
fn catalog_from_deps(deps: &[Vec<usize>]) -> InMemoryFunctionCatalog {
    let mut catalog = InMemoryFunctionCatalog::new();
    for (i, inputs) in deps.iter().enumerate() {
        let mut function = lattice_engine::DeclaredFunction::new(
            format!("Fn{:02}", i),
            lattice_core::TargetKind::Security,
        )
        .producing(format!("V{}", i), lattice_core::ValueProperties::none());
        for &dep in inputs {
            function = function.requiring(
                format!("V{}", dep),
                lattice_core::ValueProperties::none(),
            );
        }
        catalog.register(Arc::new(function));
    }
    catalog
}

/// The scheduling-independent observable outcome of a build.
#[derive(Debug, PartialEq, Eq)]
struct Outcome {
    terminals: BTreeMap<String, String>,
    failures: BTreeSet<String>,
    nodes: BTreeSet<String>,
}

fn build_outcome(
    deps: &[Vec<usize>],
    strategy: QueueStrategy,
    workers: usize,
) -> Result<Outcome, String> {
    let mut b = builder(catalog_from_deps(deps)).with_options(BuildOptions {
        max_workers: workers,
        queue: strategy,
        ..BuildOptions::default()
    });
    for i in 0..deps.len() {
        b.add_target(req(&format!("V{}", i)));
    }
    let compiled = b.build().map_err(|e| e.to_string())?;
    assert_topologically_consistent(&compiled);
    Ok(Outcome {
        terminals: compiled
            .terminal_outputs()
            .iter()
            .map(|(r, s)| (r.to_string(), s.to_string()))
            .collect(),
        failures: compiled.failures().keys().map(|r| r.to_string()).collect(),
        nodes: compiled.nodes().map(|n| n.function().to_string()).collect(),
    })
}

fn assert_topologically_consistent(compiled: &CompiledGraph) {
    let positions: HashMap<*const DependencyNode, usize> = compiled
        .topological_order()
        .enumerate()
        .map(|(i, n)| (Arc::as_ptr(n), i))
        .collect();
    for (i, node) in compiled.topological_order().enumerate() {
        for input in node.inputs() {
            if let Some(producer) = compiled.producer(input) {
                assert!(positions[&Arc::as_ptr(producer)] < i);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Layered catalogs (function i only depends on earlier functions) are
    /// always fully resolvable into one node per function.
    #[test]
    fn layered_catalogs_resolve_completely(
        raw in prop::collection::vec(prop::collection::vec(any::<usize>(), 0..3), 1..9)
    ) {
        let deps: Vec<Vec<usize>> = raw
            .iter()
            .enumerate()
            .map(|(i, inputs)| {
                if i == 0 {
                    Vec::new()
                } else {
                    inputs.iter().map(|r| r % i).collect()
                }
            })
            .collect();

        let outcome = build_outcome(&deps, QueueStrategy::ConcurrentQueue, 4)
            .expect("layered catalog must resolve");
        prop_assert!(outcome.failures.is_empty());
        prop_assert_eq!(outcome.terminals.len(), deps.len());
        // Exactly one node per function: shared requirements never duplicate.
        prop_assert_eq!(outcome.nodes.len(), deps.len());
    }

    /// Arbitrary catalogs, cyclic ones included, terminate and produce the
    /// same outcome under every queue strategy and worker count.
    #[test]
    fn outcome_is_scheduling_independent(
        raw in prop::collection::vec(prop::collection::vec(any::<usize>(), 0..3), 1..8)
    ) {
        let n = raw.len();
        let deps: Vec<Vec<usize>> = raw
            .iter()
            .map(|inputs| inputs.iter().map(|r| r % n).collect())
            .collect();

        let reference = build_outcome(&deps, QueueStrategy::Ordered, 1);
        for strategy in [
            QueueStrategy::Ordered,
            QueueStrategy::ConcurrentQueue,
            QueueStrategy::ConcurrentStack,
        ] {
            for workers in [1, 4] {
                let outcome = build_outcome(&deps, strategy, workers);
                prop_assert_eq!(&outcome, &reference, "{:?}/{}", strategy, workers);
            }
        }
    }

    /// A value resolved behind market data never grows a producing node.
    #[test]
    fn market_data_names_never_become_nodes(
        leaf_count in 1usize..5,
        consumer_inputs in prop::collection::vec(0usize..5, 1..4)
    ) {
        let mut catalog = InMemoryFunctionCatalog::new();
        let mut consumer = lattice_engine::DeclaredFunction::new(
            "ConsumerFn",
            lattice_core::TargetKind::Security,
        )
        .producing("Present Value", lattice_core::ValueProperties::none());
        for &i in &consumer_inputs {
            consumer = consumer.requiring(
                format!("Raw{}", i % leaf_count),
                lattice_core::ValueProperties::none(),
            );
        }
        catalog.register(Arc::new(consumer));
        // Competing catalog functions for the raw values, never selected.
        for i in 0..leaf_count {
            catalog.register(Arc::new(
                lattice_engine::DeclaredFunction::new(
                    format!("RawFn{}", i),
                    lattice_core::TargetKind::Security,
                )
                .producing(format!("Raw{}", i), lattice_core::ValueProperties::none()),
            ));
        }

        let mut availability = lattice_engine::FixedMarketDataAvailability::empty();
        for i in 0..leaf_count {
            availability.add(format!("Raw{}", i), security());
        }
        let mut b = common::builder_with(
            catalog,
            Arc::new(availability),
            Arc::new(lattice_traits::exclusion::NoExclusions),
        );
        b.add_target(ValueRequirement::new("Present Value", security()));
        let compiled = b.build().unwrap();

        prop_assert_eq!(compiled.node_count(), 1);
        prop_assert!(compiled.market_data().iter().all(|s| s.is_market_data()));
    }
}

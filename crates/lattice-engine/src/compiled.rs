//! The frozen, executable form of a dependency graph.
//!
//! Freezing prunes everything a downstream execution scheduler does not
//! need: nodes unreachable from the terminal outputs are dropped and output
//! specifications nobody consumes are trimmed away. The result is immutable
//! and safe to share across threads and caches.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::io::{self, Write};
use std::sync::Arc;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use lattice_core::{ResolutionFailure, ValueRequirement, ValueSpecification};

use crate::error::EngineError;
use crate::graph::{DependencyGraph, DependencyNode};

/// A frozen dependency graph for one calculation configuration.
pub struct CompiledGraph {
    name: String,
    graph: DiGraph<Arc<DependencyNode>, ()>,
    topo: Vec<NodeIndex>,
    producers: HashMap<ValueSpecification, NodeIndex>,
    terminals: BTreeMap<ValueRequirement, ValueSpecification>,
    failures: BTreeMap<ValueRequirement, ResolutionFailure>,
    market_data: BTreeSet<ValueSpecification>,
}

impl CompiledGraph {
    /// Freeze a graph under construction.
    ///
    /// Walks backwards from the terminal specifications, keeps only the
    /// reachable nodes, trims unconsumed outputs and fixes a topological
    /// order. A cycle here would mean the builder's invariants were
    /// violated, so it surfaces as an internal error rather than a failure
    /// record.
    pub fn freeze(
        name: impl Into<String>,
        graph: &DependencyGraph,
        terminals: BTreeMap<ValueRequirement, ValueSpecification>,
        failures: BTreeMap<ValueRequirement, ResolutionFailure>,
    ) -> Result<Self, EngineError> {
        let terminal_specs: BTreeSet<ValueSpecification> = terminals.values().cloned().collect();

        // Reachability sweep from the terminals.
        let mut reachable: Vec<Arc<DependencyNode>> = Vec::new();
        let mut seen: HashSet<*const DependencyNode> = HashSet::new();
        let mut queue: VecDeque<Arc<DependencyNode>> = terminal_specs
            .iter()
            .filter_map(|spec| graph.producer(spec))
            .collect();
        while let Some(node) = queue.pop_front() {
            if !seen.insert(Arc::as_ptr(&node)) {
                continue;
            }
            for input in node.inputs() {
                if let Some(producer) = graph.producer(input) {
                    queue.push_back(producer);
                }
            }
            reachable.push(node);
        }

        // Everything some kept node consumes, for output trimming and the
        // market-data leaf set.
        let consumed: HashSet<&ValueSpecification> =
            reachable.iter().flat_map(|n| n.inputs()).collect();

        let mut compiled: DiGraph<Arc<DependencyNode>, ()> = DiGraph::new();
        let mut kept: HashMap<*const DependencyNode, NodeIndex> = HashMap::new();
        for node in &reachable {
            let outputs: Vec<ValueSpecification> = node
                .outputs()
                .iter()
                .filter(|out| consumed.contains(*out) || terminal_specs.contains(*out))
                .cloned()
                .collect();
            let trimmed = Arc::new(DependencyNode::new(
                node.function().clone(),
                node.target().clone(),
                node.inputs().to_vec(),
                outputs,
            ));
            kept.insert(Arc::as_ptr(node), compiled.add_node(trimmed));
        }

        // Producer lookup goes through the build-time bindings so that
        // constraint-narrowed specifications resolve to the same node as the
        // declared output they narrow.
        let mut producers: HashMap<ValueSpecification, NodeIndex> = HashMap::new();
        for (spec, node) in graph.producer_bindings() {
            if let Some(&index) = kept.get(&Arc::as_ptr(&node)) {
                producers.entry(spec).or_insert(index);
            }
        }
        for index in compiled.node_indices() {
            let inputs = compiled[index].inputs().to_vec();
            for input in inputs {
                if let Some(&producer) = producers.get(&input) {
                    compiled.add_edge(producer, index, ());
                }
            }
        }

        let topo = toposort(&compiled, None)
            .map_err(|_| EngineError::Internal("compiled graph contains a cycle".into()))?;

        let market_data = graph
            .market_data()
            .into_iter()
            .filter(|spec| consumed.contains(spec) || terminal_specs.contains(spec))
            .collect();

        Ok(Self {
            name: name.into(),
            graph: compiled,
            topo,
            producers,
            terminals,
            failures,
            market_data,
        })
    }

    /// The calculation configuration this graph belongs to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resolved terminal outputs, requirement by requirement.
    pub fn terminal_outputs(&self) -> &BTreeMap<ValueRequirement, ValueSpecification> {
        &self.terminals
    }

    /// The terminal requirements that could not be resolved.
    pub fn failures(&self) -> &BTreeMap<ValueRequirement, ResolutionFailure> {
        &self.failures
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Iterate all nodes, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &Arc<DependencyNode>> {
        self.graph.node_weights()
    }

    /// The nodes in execution order: every producer before its consumers.
    pub fn topological_order(&self) -> impl Iterator<Item = &Arc<DependencyNode>> {
        self.topo.iter().map(move |&index| &self.graph[index])
    }

    /// The node producing a specification, if any.
    pub fn producer(&self, spec: &ValueSpecification) -> Option<&Arc<DependencyNode>> {
        self.producers.get(spec).map(|&index| &self.graph[index])
    }

    /// The market-data leaf specifications the plan consumes.
    pub fn market_data(&self) -> &BTreeSet<ValueSpecification> {
        &self.market_data
    }

    /// Write an ASCII rendering of the graph structure.
    ///
    /// One line per terminal, then the nodes in execution order with their
    /// inputs; intended for operator debugging.
    pub fn write_structure<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "graph \"{}\"", self.name)?;
        for (requirement, spec) in &self.terminals {
            writeln!(out, "  terminal {} -> {}", requirement, spec)?;
        }
        for (requirement, failure) in &self.failures {
            writeln!(out, "  failed {} ({})", requirement, failure)?;
        }
        for spec in &self.market_data {
            writeln!(out, "  market data {}", spec)?;
        }
        for node in self.topological_order() {
            writeln!(out, "  node {}", node)?;
            for input in node.inputs() {
                writeln!(out, "    <- {}", input)?;
            }
        }
        Ok(())
    }
}

//! The dependency graph under construction.
//!
//! Shared by all workers of one build. Mutation happens only through atomic
//! insert-if-absent operations, so concurrent branches needing the same
//! computation converge on a single canonical node. Once a build completes
//! the graph is frozen into a [`CompiledGraph`](crate::compiled::CompiledGraph)
//! and never mutated again.

use std::fmt;
use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use serde::Serialize;

use lattice_core::{FunctionId, Target, ValueSpecification};

/// One scheduled function invocation with bound inputs and outputs.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize)]
pub struct DependencyNode {
    function: FunctionId,
    target: Target,
    inputs: Vec<ValueSpecification>,
    outputs: Vec<ValueSpecification>,
}

impl DependencyNode {
    /// Create a node.
    pub fn new(
        function: FunctionId,
        target: Target,
        inputs: Vec<ValueSpecification>,
        outputs: Vec<ValueSpecification>,
    ) -> Self {
        Self {
            function,
            target,
            inputs,
            outputs,
        }
    }

    /// The invoked function.
    pub fn function(&self) -> &FunctionId {
        &self.function
    }

    /// The target the function is applied to.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// The input specifications consumed, in declaration order.
    pub fn inputs(&self) -> &[ValueSpecification] {
        &self.inputs
    }

    /// The output specifications produced.
    pub fn outputs(&self) -> &[ValueSpecification] {
        &self.outputs
    }

    /// Whether the node produces the given specification.
    pub fn produces(&self, spec: &ValueSpecification) -> bool {
        self.outputs.iter().any(|s| s == spec)
    }
}

impl fmt::Display for DependencyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) inputs={} outputs={}",
            self.function,
            self.target,
            self.inputs.len(),
            self.outputs.len()
        )
    }
}

/// Node identity: a node never appears twice for the same function, target
/// and resolved input set.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
struct NodeKey {
    function: FunctionId,
    target: Target,
    inputs: Vec<ValueSpecification>,
}

/// The shared, deduplicated graph one build constructs.
pub struct DependencyGraph {
    nodes: DashMap<NodeKey, Arc<DependencyNode>>,
    producers: DashMap<ValueSpecification, Arc<DependencyNode>>,
    market_data: DashSet<ValueSpecification>,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: DashMap::new(),
            producers: DashMap::new(),
            market_data: DashSet::new(),
        }
    }

    /// Insert a node, or return the canonical one if an equivalent node
    /// already exists.
    ///
    /// Idempotent: identity is (function, target, inputs). All outputs of
    /// the canonical node are bound as producers.
    pub fn add_node(
        &self,
        function: FunctionId,
        target: Target,
        inputs: Vec<ValueSpecification>,
        outputs: Vec<ValueSpecification>,
    ) -> Arc<DependencyNode> {
        let key = NodeKey {
            function: function.clone(),
            target: target.clone(),
            inputs: inputs.clone(),
        };
        let node = self
            .nodes
            .entry(key)
            .or_insert_with(|| Arc::new(DependencyNode::new(function, target, inputs, outputs)))
            .clone();
        for output in node.outputs() {
            self.bind(output.clone(), node.clone());
        }
        node
    }

    /// Bind a specification to its producing node, first binding wins.
    pub fn bind(&self, spec: ValueSpecification, node: Arc<DependencyNode>) {
        self.producers.entry(spec).or_insert(node);
    }

    /// Record a market-data leaf specification.
    pub fn add_market_data(&self, spec: ValueSpecification) {
        self.market_data.insert(spec);
    }

    /// The node producing a specification, if any.
    pub fn producer(&self, spec: &ValueSpecification) -> Option<Arc<DependencyNode>> {
        self.producers.get(spec).map(|n| n.value().clone())
    }

    /// Whether a specification is a recorded market-data leaf.
    pub fn is_market_data(&self, spec: &ValueSpecification) -> bool {
        self.market_data.contains(spec)
    }

    /// Number of distinct nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Snapshot of all nodes.
    pub fn nodes(&self) -> Vec<Arc<DependencyNode>> {
        self.nodes.iter().map(|e| e.value().clone()).collect()
    }

    /// Snapshot of every specification-to-producer binding.
    ///
    /// Covers both declared node outputs and constraint-narrowed
    /// specifications bound on top of them.
    pub fn producer_bindings(&self) -> Vec<(ValueSpecification, Arc<DependencyNode>)> {
        self.producers
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    /// Snapshot of all market-data leaves.
    pub fn market_data(&self) -> Vec<ValueSpecification> {
        self.market_data.iter().map(|s| s.key().clone()).collect()
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

//! # Lattice Engine
//!
//! The concurrent dependency-graph builder for Lattice.
//!
//! This crate provides:
//! - [`GraphBuilder`]: candidate search, backtracking and cycle rejection
//!   under a concurrent worker pool
//! - [`CompiledGraph`] / [`CompiledView`]: the frozen, executable plans
//! - [`RunQueue`] strategies: ordered, concurrent FIFO, concurrent LIFO
//! - [`DefaultFunctionResolver`] and an in-memory [`FunctionCatalog`] impl
//! - Market-data availability and exclusion-group policies
//!
//! ## Architecture
//!
//! ```text
//! CalculationConfig ─> GraphBuilder ─┬─> RunQueue ─> workers
//!                                    │
//!         FunctionResolver <─────────┤ (per requirement:
//!         MarketDataAvailability <───┤  oracle, candidates,
//!         ExclusionGroups <──────────┘  recurse, commit node)
//!                                    │
//!                                    └─> DependencyGraph ─freeze─> CompiledGraph
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let resolver = Arc::new(DefaultFunctionResolver::new(catalog));
//! let mut builder = GraphBuilder::new(
//!     "Default",
//!     resolver,
//!     Arc::new(FixedMarketDataAvailability::empty()),
//!     Arc::new(NoExclusions),
//! );
//! builder.add_target(ValueRequirement::new(names::PRESENT_VALUE, target));
//! let compiled = builder.build()?;
//! for node in compiled.topological_order() {
//!     // hand to the execution scheduler
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod catalog;
pub mod compiled;
pub mod error;
pub mod exclusion;
pub mod failures;
pub mod graph;
pub mod market_data;
pub mod resolver;
pub mod run_queue;
pub mod view;

// Re-exports
pub use builder::{CancelToken, GraphBuilder, ResolveTask};
pub use catalog::{DeclaredFunction, InMemoryFunctionCatalog};
pub use compiled::CompiledGraph;
pub use error::EngineError;
pub use exclusion::MapExclusionGroups;
pub use failures::{CollectingFailureListener, LoggingFailureListener};
pub use graph::{DependencyGraph, DependencyNode};
pub use market_data::{FixedMarketDataAvailability, OptimisticMarketDataAvailability};
pub use resolver::DefaultFunctionResolver;
pub use run_queue::{
    create_run_queue, ConcurrentLinkedQueue, ConcurrentStack, OrderedRunQueue, RunQueue,
};
pub use view::{CompiledView, ViewCompiler};

// The contracts implemented here, re-exported for convenience.
pub use lattice_traits::function::FunctionCatalog;

//! # Lattice Traits
//!
//! Trait definitions for the Lattice dependency-graph resolution engine.
//!
//! This crate contains the contracts the graph builder is injected with;
//! implementations live in `lattice-engine` or in consumer crates.
//!
//! ## Module Structure
//!
//! - [`function`]: calculation functions and the enumerable catalog
//! - [`resolver`]: candidate resolution and priority ordering
//! - [`market_data`]: raw market data availability
//! - [`exclusion`]: mutually-exclusive function policies
//! - [`output`]: resolution failure listeners
//! - [`config`]: build options and calculation configurations
//!
//! ## Dependency Injection
//!
//! The graph builder takes these contracts as constructor parameters; there
//! is no global lookup:
//!
//! ```ignore
//! GraphBuilder::new(
//!     "Default",
//!     Arc::new(DefaultFunctionResolver::new(catalog)),
//!     Arc::new(FixedMarketDataAvailability::empty()),
//!     Arc::new(NoExclusions),
//! )
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod exclusion;
pub mod function;
pub mod market_data;
pub mod output;
pub mod resolver;

pub use config::{BuildOptions, CalculationConfig, QueueStrategy, ViewDefinition};
pub use exclusion::{ExclusionGroups, NoExclusions};
pub use function::{CalculationFunction, FunctionCatalog};
pub use market_data::MarketDataAvailability;
pub use output::FailureListener;
pub use resolver::{FunctionPriority, FunctionResolver};

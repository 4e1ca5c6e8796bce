//! # Lattice Core
//!
//! The value model for the Lattice dependency-graph resolution engine.
//!
//! This crate provides the immutable descriptors exchanged between a caller,
//! the function catalog and the graph builder:
//!
//! - [`Target`]: the entity a value is computed for
//! - [`ValueRequirement`]: "someone wants X computed for Y under these constraints"
//! - [`ValueSpecification`]: a concrete, fully-constrained value identity
//! - [`ValueProperties`]: constraint/property sets with wildcard support
//! - [`ResolutionFailure`]: why a requirement could not be satisfied
//!
//! ## Design Philosophy
//!
//! - **Immutability**: every descriptor is a plain value; equality is
//!   structural and all types are usable as map keys
//! - **Type Safety**: newtypes prevent mixing value names, function ids and
//!   raw strings
//! - **Determinism**: every type is totally ordered so collections of them
//!   can be sorted into a canonical order regardless of construction order

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod failure;
pub mod ids;
pub mod names;
pub mod properties;
pub mod requirement;
pub mod specification;
pub mod target;

pub use failure::{CandidateAttempt, FailureKind, Rejection, ResolutionFailure};
pub use ids::{FunctionId, ValueName};
pub use properties::{PropertyValue, ValueProperties, ValuePropertiesBuilder};
pub use requirement::ValueRequirement;
pub use specification::ValueSpecification;
pub use target::{Target, TargetKind};

//! Market data availability contract.

use lattice_core::ValueRequirement;

/// Answers whether a requirement is natively available as raw market data.
///
/// Consulted before the function resolver for every requirement: raw data is
/// cheaper and more certain than any derived computation path, so an
/// available requirement terminates its branch with a market-data leaf.
///
/// Implementations must be fast, synchronous, in-memory predicates; the
/// graph builder calls them from every worker and never blocks on I/O.
pub trait MarketDataAvailability: Send + Sync {
    /// Whether the requirement can be sourced directly from market data.
    fn is_available(&self, requirement: &ValueRequirement) -> bool;
}

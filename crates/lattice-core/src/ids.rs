//! Identifier types used across the resolution engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a computable value (e.g. `"Present Value"`, `"Discount Curve"`).
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ValueName(pub String);

impl ValueName {
    /// Create a new value name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ValueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ValueName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ValueName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identity of a calculation function in the catalog.
///
/// The reserved identity [`FunctionId::market_data`] marks specifications
/// sourced directly from market data rather than produced by a node.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct FunctionId(pub String);

/// Reserved identity for market-data sourced specifications.
const MARKET_DATA_SOURCING: &str = "MarketDataSourcing";

impl FunctionId {
    /// Create a new function id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The reserved identity used for market-data leaf specifications.
    pub fn market_data() -> Self {
        Self(MARKET_DATA_SOURCING.to_string())
    }

    /// Whether this is the reserved market-data sourcing identity.
    pub fn is_market_data(&self) -> bool {
        self.0 == MARKET_DATA_SOURCING
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for FunctionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FunctionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_data_identity_is_recognised() {
        assert!(FunctionId::market_data().is_market_data());
        assert!(!FunctionId::new("DiscountingPv").is_market_data());
    }

    #[test]
    fn value_names_order_lexically() {
        let mut names = vec![ValueName::new("PV01"), ValueName::new("Delta")];
        names.sort();
        assert_eq!(names[0].as_str(), "Delta");
    }
}

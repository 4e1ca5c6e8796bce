//! Computation targets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of entity a value is computed for.
///
/// A closed set: functions declare applicability against a kind rather than
/// dispatching over an open type hierarchy.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum TargetKind {
    /// A portfolio or aggregation node.
    Portfolio,
    /// A position in a security.
    Position,
    /// A single trade.
    Trade,
    /// A security.
    Security,
    /// A currency (e.g. for curves and FX values).
    Currency,
    /// Anything else addressable by an identifier alone.
    Primitive,
}

impl TargetKind {
    /// Short uppercase tag used in display form.
    pub fn tag(&self) -> &'static str {
        match self {
            TargetKind::Portfolio => "PORTFOLIO",
            TargetKind::Position => "POSITION",
            TargetKind::Trade => "TRADE",
            TargetKind::Security => "SECURITY",
            TargetKind::Currency => "CURRENCY",
            TargetKind::Primitive => "PRIMITIVE",
        }
    }
}

/// Identifies the entity being computed for.
///
/// Immutable and hashable; used as a map key throughout the engine. Display
/// form is `KIND~id`, e.g. `SECURITY~42` or `CURRENCY~USD`.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Target {
    kind: TargetKind,
    id: String,
}

impl Target {
    /// Create a target of an arbitrary kind.
    pub fn new(kind: TargetKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }

    /// A portfolio target.
    pub fn portfolio(id: impl Into<String>) -> Self {
        Self::new(TargetKind::Portfolio, id)
    }

    /// A position target.
    pub fn position(id: impl Into<String>) -> Self {
        Self::new(TargetKind::Position, id)
    }

    /// A trade target.
    pub fn trade(id: impl Into<String>) -> Self {
        Self::new(TargetKind::Trade, id)
    }

    /// A security target.
    pub fn security(id: impl Into<String>) -> Self {
        Self::new(TargetKind::Security, id)
    }

    /// A currency target.
    pub fn currency(id: impl Into<String>) -> Self {
        Self::new(TargetKind::Currency, id)
    }

    /// A primitive target.
    pub fn primitive(id: impl Into<String>) -> Self {
        Self::new(TargetKind::Primitive, id)
    }

    /// The target kind.
    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    /// The target identifier.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}~{}", self.kind.tag(), self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_form() {
        assert_eq!(Target::security("42").to_string(), "SECURITY~42");
        assert_eq!(Target::currency("USD").to_string(), "CURRENCY~USD");
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(Target::security("42"), Target::security("42"));
        assert_ne!(Target::security("42"), Target::position("42"));
    }
}

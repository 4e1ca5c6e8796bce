//! Resolution failure records.
//!
//! Failures are data, not panics: the builder threads them through `Result`
//! and records them per terminal so a compiled view can report some outputs
//! as present and others as not computable, with the chain of candidate
//! rejections that led there.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::FunctionId;
use crate::requirement::ValueRequirement;

/// Why a single requirement could not be resolved.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ResolutionFailure {
    /// The requirement that failed.
    pub requirement: ValueRequirement,
    /// The failure classification.
    pub kind: FailureKind,
}

/// Classification of a requirement-level failure.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum FailureKind {
    /// No function in the catalog claims to produce the value.
    NoCandidates,
    /// The requirement was already being resolved on the current path.
    Cyclic,
    /// The build was cancelled while this requirement was in flight.
    Cancelled,
    /// Every candidate was tried and rejected.
    Exhausted(Vec<CandidateAttempt>),
}

/// One candidate function tried and the reason it was rejected.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CandidateAttempt {
    /// The candidate that was tried.
    pub function: FunctionId,
    /// Why it was rejected.
    pub rejection: Rejection,
}

/// Why a candidate function was rejected for a requirement.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum Rejection {
    /// None of the candidate's declared outputs satisfied the constraints.
    NoMatchingOutput,
    /// The candidate conflicts with an ancestor function on the same target.
    Excluded {
        /// The ancestor function in the same exclusion group.
        conflicting: FunctionId,
    },
    /// One of the candidate's inputs could not be resolved.
    UnresolvedInput {
        /// The input requirement that failed.
        input: ValueRequirement,
        /// The failure that input produced.
        cause: Box<ResolutionFailure>,
    },
}

impl ResolutionFailure {
    /// Create a failure record.
    pub fn new(requirement: ValueRequirement, kind: FailureKind) -> Self {
        Self { requirement, kind }
    }

    /// Whether no rejection anywhere in this chain was cyclic.
    ///
    /// Cycle rejections depend on the resolution path that observed them, so
    /// a cycle-tainted failure is not reusable from a different branch.
    pub fn is_cycle_free(&self) -> bool {
        match &self.kind {
            FailureKind::NoCandidates => true,
            FailureKind::Cyclic | FailureKind::Cancelled => false,
            FailureKind::Exhausted(attempts) => attempts.iter().all(|a| match &a.rejection {
                Rejection::NoMatchingOutput | Rejection::Excluded { .. } => true,
                Rejection::UnresolvedInput { cause, .. } => cause.is_cycle_free(),
            }),
        }
    }

    /// Multi-line, indented rendering of the full rejection chain.
    pub fn explain(&self) -> String {
        let mut out = String::new();
        self.explain_into(&mut out, 0);
        out
    }

    fn explain_into(&self, out: &mut String, depth: usize) {
        let pad = "  ".repeat(depth);
        match &self.kind {
            FailureKind::NoCandidates => {
                out.push_str(&format!("{}{}: no candidate functions\n", pad, self.requirement));
            }
            FailureKind::Cyclic => {
                out.push_str(&format!("{}{}: cyclic\n", pad, self.requirement));
            }
            FailureKind::Cancelled => {
                out.push_str(&format!("{}{}: cancelled\n", pad, self.requirement));
            }
            FailureKind::Exhausted(attempts) => {
                out.push_str(&format!(
                    "{}{}: {} candidate(s) rejected\n",
                    pad,
                    self.requirement,
                    attempts.len()
                ));
                for attempt in attempts {
                    match &attempt.rejection {
                        Rejection::NoMatchingOutput => {
                            out.push_str(&format!(
                                "{}  {}: no matching output\n",
                                pad, attempt.function
                            ));
                        }
                        Rejection::Excluded { conflicting } => {
                            out.push_str(&format!(
                                "{}  {}: excluded against {}\n",
                                pad, attempt.function, conflicting
                            ));
                        }
                        Rejection::UnresolvedInput { input, cause } => {
                            out.push_str(&format!(
                                "{}  {}: unresolved input {}\n",
                                pad, attempt.function, input
                            ));
                            cause.explain_into(out, depth + 2);
                        }
                    }
                }
            }
        }
    }
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FailureKind::NoCandidates => {
                write!(f, "no candidate functions for {}", self.requirement)
            }
            FailureKind::Cyclic => write!(f, "cyclic requirement {}", self.requirement),
            FailureKind::Cancelled => write!(f, "resolution cancelled for {}", self.requirement),
            FailureKind::Exhausted(attempts) => write!(
                f,
                "all {} candidate(s) rejected for {}",
                attempts.len(),
                self.requirement
            ),
        }
    }
}

impl std::error::Error for ResolutionFailure {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::Target;

    fn req(name: &str) -> ValueRequirement {
        ValueRequirement::new(name, Target::security("42"))
    }

    #[test]
    fn cycle_taint_propagates_through_input_chain() {
        let inner = ResolutionFailure::new(req("Discount Curve"), FailureKind::Cyclic);
        let outer = ResolutionFailure::new(
            req("Present Value"),
            FailureKind::Exhausted(vec![CandidateAttempt {
                function: FunctionId::new("DiscountingPv"),
                rejection: Rejection::UnresolvedInput {
                    input: req("Discount Curve"),
                    cause: Box::new(inner),
                },
            }]),
        );
        assert!(!outer.is_cycle_free());
    }

    #[test]
    fn exhausted_without_cycles_is_cycle_free() {
        let failure = ResolutionFailure::new(
            req("Present Value"),
            FailureKind::Exhausted(vec![CandidateAttempt {
                function: FunctionId::new("DiscountingPv"),
                rejection: Rejection::NoMatchingOutput,
            }]),
        );
        assert!(failure.is_cycle_free());
    }

    #[test]
    fn explain_renders_nested_chain() {
        let inner = ResolutionFailure::new(req("Discount Curve"), FailureKind::NoCandidates);
        let outer = ResolutionFailure::new(
            req("Present Value"),
            FailureKind::Exhausted(vec![CandidateAttempt {
                function: FunctionId::new("DiscountingPv"),
                rejection: Rejection::UnresolvedInput {
                    input: req("Discount Curve"),
                    cause: Box::new(inner),
                },
            }]),
        );
        let text = outer.explain();
        assert!(text.contains("1 candidate(s) rejected"));
        assert!(text.contains("no candidate functions"));
    }
}

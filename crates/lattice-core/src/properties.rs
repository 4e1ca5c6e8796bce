//! Constraint and property sets attached to requirements and specifications.
//!
//! A [`ValueProperties`] maps property names to either a wildcard or a set of
//! admissible string values. The same type serves two roles:
//!
//! - on a [`ValueRequirement`](crate::ValueRequirement) it expresses
//!   *constraints* the caller demands
//! - on a [`ValueSpecification`](crate::ValueSpecification) it expresses the
//!   *properties* a producer offers
//!
//! Satisfaction and composition are the two operations the resolver relies
//! on: a requirement is satisfiable by an offer when every constrained
//! property is present and compatible, and composing an offer against the
//! constraints narrows any wildcards down to the demanded values.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The admissible values of a single property.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Wildcard: any value is acceptable (or offered).
    Any,
    /// A non-empty set of admissible values.
    Of(BTreeSet<String>),
}

impl PropertyValue {
    /// A single concrete value.
    pub fn single(value: impl Into<String>) -> Self {
        let mut set = BTreeSet::new();
        set.insert(value.into());
        PropertyValue::Of(set)
    }

    /// Whether this value set is compatible with another.
    ///
    /// Wildcard on either side is compatible; two explicit sets are
    /// compatible when they intersect.
    pub fn compatible_with(&self, other: &PropertyValue) -> bool {
        match (self, other) {
            (PropertyValue::Any, _) | (_, PropertyValue::Any) => true,
            (PropertyValue::Of(a), PropertyValue::Of(b)) => !a.is_disjoint(b),
        }
    }
}

/// An immutable, ordered map of property name to admissible values.
#[derive(Debug, Clone, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ValueProperties {
    map: BTreeMap<String, PropertyValue>,
}

impl ValueProperties {
    /// The empty property set (no constraints).
    pub fn none() -> Self {
        Self::default()
    }

    /// Start building a property set.
    pub fn builder() -> ValuePropertiesBuilder {
        ValuePropertiesBuilder::default()
    }

    /// Whether no properties are present.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of properties present.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// The values of a named property, if present.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.map.get(name)
    }

    /// Iterate the property names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    /// Whether every property demanded here is present and compatible in
    /// `offered`.
    ///
    /// `self` plays the constraints role. An empty constraint set is
    /// satisfied by anything.
    pub fn is_satisfied_by(&self, offered: &ValueProperties) -> bool {
        self.map.iter().all(|(name, wanted)| {
            offered
                .map
                .get(name)
                .is_some_and(|have| wanted.compatible_with(have))
        })
    }

    /// Narrow this (offered) property set against a set of constraints.
    ///
    /// For each property present here, a wildcard collapses to the
    /// constrained values and two explicit sets intersect. Properties the
    /// constraints do not mention pass through unchanged. Callers check
    /// [`is_satisfied_by`](ValueProperties::is_satisfied_by) first, so
    /// intersections are never empty.
    pub fn compose(&self, constraints: &ValueProperties) -> ValueProperties {
        let map = self
            .map
            .iter()
            .map(|(name, offered)| {
                let value = match (offered, constraints.map.get(name)) {
                    (_, None) | (_, Some(PropertyValue::Any)) => offered.clone(),
                    (PropertyValue::Any, Some(wanted)) => wanted.clone(),
                    (PropertyValue::Of(have), Some(PropertyValue::Of(want))) => {
                        PropertyValue::Of(have.intersection(want).cloned().collect())
                    }
                };
                (name.clone(), value)
            })
            .collect();
        ValueProperties { map }
    }

    /// A copy with one property set to a single value.
    pub fn with(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut map = self.map.clone();
        map.insert(name.into(), PropertyValue::single(value));
        ValueProperties { map }
    }

    /// A copy without the named property.
    pub fn without(&self, name: &str) -> Self {
        let mut map = self.map.clone();
        map.remove(name);
        ValueProperties { map }
    }
}

impl fmt::Display for ValueProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.map.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            match value {
                PropertyValue::Any => write!(f, "{}=*", name)?,
                PropertyValue::Of(values) => {
                    let joined: Vec<&str> = values.iter().map(String::as_str).collect();
                    write!(f, "{}=[{}]", name, joined.join("|"))?;
                }
            }
        }
        write!(f, "}}")
    }
}

/// Builder for [`ValueProperties`].
#[derive(Debug, Default)]
pub struct ValuePropertiesBuilder {
    map: BTreeMap<String, PropertyValue>,
}

impl ValuePropertiesBuilder {
    /// Add a property with a single value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.map.insert(name.into(), PropertyValue::single(value));
        self
    }

    /// Add a property admitting any of the given values.
    pub fn with_values<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.map.insert(
            name.into(),
            PropertyValue::Of(values.into_iter().map(Into::into).collect()),
        );
        self
    }

    /// Add a wildcard property.
    pub fn with_any(mut self, name: impl Into<String>) -> Self {
        self.map.insert(name.into(), PropertyValue::Any);
        self
    }

    /// Finish building.
    pub fn build(self) -> ValueProperties {
        ValueProperties { map: self.map }
    }
}

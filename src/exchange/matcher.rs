//! Header matching for headers-exchange bindings
//!
//! A [`HeadersBinding`] is derived once from a [`Binding`]'s arguments. The
//! reserved [`X_MATCH`] key selects conjunctive or disjunctive matching;
//! every other argument becomes a constraint. An argument whose value is
//! [`FieldValue::Void`] only requires the header to be present.
//!
//! Matching is a pure function of the constraints and the message headers:
//! a built matcher can be shared across threads and evaluated without locks.

use std::fmt;

use super::{Binding, Error, MessageHeaders, Result};
use crate::protocol::FieldValue;

/// Reserved binding argument selecting the match mode (case-sensitive).
pub const X_MATCH: &str = "X-match";

/// How constraints combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchMode {
    /// Every constraint must hold; vacuously true when there are none.
    #[default]
    All,
    /// At least one constraint must hold; false when there are none.
    Any,
}

impl MatchMode {
    /// Parse the value of an [`X_MATCH`] argument.
    pub fn from_argument(value: &FieldValue) -> Result<Self> {
        match value.as_str() {
            Some("all") => Ok(Self::All),
            Some("any") => Ok(Self::Any),
            _ => Err(Error::InvalidMatchMode {
                value: value.to_string(),
            }),
        }
    }

    /// Argument spelling
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Any => "any",
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Constraint {
    header: String,
    // `None` means presence only.
    expected: Option<FieldValue>,
}

impl Constraint {
    fn is_satisfied_by(&self, headers: &MessageHeaders) -> bool {
        match (&self.expected, headers.get(&self.header)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(expected), Some(actual)) => expected == actual,
        }
    }
}

/// Compiled matcher for one binding.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadersBinding {
    binding: Binding,
    mode: MatchMode,
    constraints: Vec<Constraint>,
}

impl HeadersBinding {
    /// Build the matcher from `binding`'s arguments.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMatchMode`] if `X-match` is present with a
    /// value other than `"all"` or `"any"`.
    pub fn new(binding: Binding) -> Result<Self> {
        let mut mode = MatchMode::default();
        let mut constraints = Vec::with_capacity(binding.arguments().len());

        for (key, value) in binding.arguments().iter() {
            if key == X_MATCH {
                mode = MatchMode::from_argument(value)?;
                continue;
            }
            constraints.push(Constraint {
                header: key.to_owned(),
                expected: (!value.is_void()).then(|| value.clone()),
            });
        }

        Ok(Self {
            binding,
            mode,
            constraints,
        })
    }

    /// Whether a message carrying `headers` should be routed to this
    /// binding's queue.
    ///
    /// Headers not named by any constraint never affect the result.
    #[must_use]
    pub fn matches(&self, headers: &MessageHeaders) -> bool {
        match self.mode {
            MatchMode::All => {
                headers.contains_all(self.constraints.iter().map(|c| c.header.as_str()))
                    && self.constraints.iter().all(|c| c.is_satisfied_by(headers))
            }
            MatchMode::Any => self.constraints.iter().any(|c| c.is_satisfied_by(headers)),
        }
    }

    /// Binding this matcher was built from
    #[must_use]
    pub const fn binding(&self) -> &Binding {
        &self.binding
    }

    /// Selected match mode
    #[must_use]
    pub const fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Number of header constraints, `X-match` excluded.
    #[must_use]
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Header names the binding constrains.
    pub fn constrained_headers(&self) -> impl Iterator<Item = &str> {
        self.constraints.iter().map(|c| c.header.as_str())
    }
}

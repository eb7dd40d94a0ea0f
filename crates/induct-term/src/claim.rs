//! Reachability claims, rewrite rules and the `decreases` annotation

use crate::error::AnnotationError;
use crate::term::{Sort, Term};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A well-founded measure on one variable: `"<variable>, <measure>, <floor>"`
///
/// `measure` names a binary predicate; `floor` is the integer literal at which
/// the induction bottoms out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Decreases {
    pub variable: String,
    pub measure: String,
    pub floor: BigInt,
}

impl Decreases {
    pub fn new(variable: impl Into<String>, measure: impl Into<String>, floor: BigInt) -> Self {
        Self {
            variable: variable.into(),
            measure: measure.into(),
            floor,
        }
    }

    /// Parse the comma-separated three-field form
    pub fn parse(raw: &str) -> Result<Self, AnnotationError> {
        let fields: Vec<&str> = raw.split(',').map(str::trim).collect();
        if fields.len() != 3 {
            return Err(AnnotationError::new(
                raw,
                format!("expected 3 comma-separated fields, found {}", fields.len()),
            ));
        }
        Self::from_fields(raw, fields[0], fields[1], fields[2])
    }

    /// Build from three separately supplied fields (e.g. the string arguments of
    /// a `decreasesInduction` predicate). `raw` is only used for error messages.
    pub fn from_fields(
        raw: &str,
        variable: &str,
        measure: &str,
        floor: &str,
    ) -> Result<Self, AnnotationError> {
        if variable.is_empty() {
            return Err(AnnotationError::new(raw, "variable name is empty"));
        }
        if measure.is_empty() {
            return Err(AnnotationError::new(raw, "measure name is empty"));
        }
        let floor = floor.parse::<BigInt>().map_err(|_| {
            AnnotationError::new(raw, format!("floor `{floor}` is not an integer literal"))
        })?;
        Ok(Self::new(variable, measure, floor))
    }

    /// The floor as an `Int` constant
    pub fn floor_term(&self) -> Term {
        Term::int(&self.floor)
    }
}

impl FromStr for Decreases {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Decreases {
    type Error = AnnotationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Decreases> for String {
    fn from(value: Decreases) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Decreases {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.variable, self.measure, self.floor)
    }
}

/// A reachability obligation: from states satisfying `requires`, every
/// execution of `body` reaches a state satisfying `ensures`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub body: Term,
    #[serde(default = "Term::truth")]
    pub requires: Term,
    #[serde(default = "Term::truth")]
    pub ensures: Term,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decreases: Option<Decreases>,
}

impl Claim {
    pub fn new(body: Term) -> Self {
        Self {
            label: None,
            body,
            requires: Term::truth(),
            ensures: Term::truth(),
            decreases: None,
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_requires(mut self, requires: Term) -> Self {
        self.requires = requires;
        self
    }

    #[must_use]
    pub fn with_ensures(mut self, ensures: Term) -> Self {
        self.ensures = ensures;
        self
    }

    #[must_use]
    pub fn with_decreases(mut self, decreases: Decreases) -> Self {
        self.decreases = Some(decreases);
        self
    }

    /// Attach a raw `decreases` attribute, validating its shape
    pub fn annotate(self, raw: &str) -> Result<Self, AnnotationError> {
        Ok(self.with_decreases(Decreases::parse(raw)?))
    }

    /// Substitute in body, requires and ensures; label and annotation are kept
    pub fn substitute(&self, name: &str, replacement: &Term) -> Claim {
        Claim {
            label: self.label.clone(),
            body: self.body.substitute(name, replacement),
            requires: self.requires.substitute(name, replacement),
            ensures: self.ensures.substitute(name, replacement),
            decreases: self.decreases.clone(),
        }
    }

    pub fn occurs(&self, name: &str) -> bool {
        self.body.occurs(name) || self.requires.occurs(name) || self.ensures.occurs(name)
    }

    /// Sort annotations of every occurrence of `name` across all three parts
    pub fn variable_sorts(&self, name: &str) -> Vec<Option<Sort>> {
        let mut sorts = self.body.variable_sorts(name);
        sorts.extend(self.requires.variable_sorts(name));
        sorts.extend(self.ensures.variable_sorts(name));
        sorts
    }
}

/// How the compiler should read a [`Rule`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    /// An ordinary rewrite taking exactly one step
    #[default]
    OneStep,
    /// A trusted reachability lemma: the right-hand side is reached in one or
    /// more steps. Induction hypotheses are emitted this way.
    Reachability,
}

/// A conditional rewrite added to a semantics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub body: Term,
    pub requires: Term,
    pub ensures: Term,
    /// Lower values are tried first
    pub priority: u32,
    pub label: String,
    #[serde(default)]
    pub kind: RuleKind,
}

impl Rule {
    pub fn substitute(&self, name: &str, replacement: &Term) -> Rule {
        Rule {
            body: self.body.substitute(name, replacement),
            requires: self.requires.substitute(name, replacement),
            ensures: self.ensures.substitute(name, replacement),
            priority: self.priority,
            label: self.label.clone(),
            kind: self.kind,
        }
    }

    pub fn occurs(&self, name: &str) -> bool {
        self.body.occurs(name) || self.requires.occurs(name) || self.ensures.occurs(name)
    }
}

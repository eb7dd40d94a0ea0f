//! Constrained symbolic states

use crate::term::{and_bool, Term};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A symbolic configuration together with the path condition under which it is reached
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolicState {
    pub config: Term,
    #[serde(default)]
    pub constraints: Vec<Term>,
}

impl SymbolicState {
    pub fn new(config: Term) -> Self {
        Self {
            config,
            constraints: Vec::new(),
        }
    }

    /// Add a constraint; a literal `true` is dropped
    #[must_use]
    pub fn with_constraint(mut self, constraint: Term) -> Self {
        self.add_constraint(constraint);
        self
    }

    pub fn add_constraint(&mut self, constraint: Term) {
        if !constraint.is_true() && !self.constraints.contains(&constraint) {
            self.constraints.push(constraint);
        }
    }

    /// All constraints as a single conjunction
    pub fn path_condition(&self) -> Term {
        and_bool(self.constraints.iter().cloned())
    }

    pub fn substitute(&self, name: &str, replacement: &Term) -> SymbolicState {
        SymbolicState {
            config: self.config.substitute(name, replacement),
            constraints: self
                .constraints
                .iter()
                .map(|c| c.substitute(name, replacement))
                .collect(),
        }
    }
}

impl fmt::Display for SymbolicState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.config)?;
        for c in &self.constraints {
            write!(f, " /\\ {c}")?;
        }
        Ok(())
    }
}

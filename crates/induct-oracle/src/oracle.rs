//! The oracle capability consumed by the proof search

use crate::error::OracleResult;
use async_trait::async_trait;
use induct_term::SymbolicState;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Identifier of the rewrite step(s) that produced a successor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepLabel(pub String);

impl StepLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Label for a step the oracle did not attribute to a named rule
    pub fn unlabelled(depth: u32) -> Self {
        Self(format!("basic-block-{depth}"))
    }
}

impl fmt::Display for StepLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One branch returned by [`SymbolicOracle::step`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Successor {
    pub state: SymbolicState,
    pub label: StepLabel,
    /// Number of rewrite steps taken to reach `state`
    pub depth: u32,
}

/// Outcome of advancing one state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    /// The state advanced; every resulting branch is listed
    Successors(Vec<Successor>),
    /// No rule applies
    Stuck,
    /// The path condition is unsatisfiable; the branch is dead
    Vacuous,
}

/// A compiled semantics the oracle can execute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticsHandle {
    /// Output directory of the compiler
    pub definition_dir: PathBuf,
    pub main_module: String,
    pub syntax_module: String,
}

/// Symbolic execution and entailment over a compiled semantics.
///
/// Calls are strictly sequential; implementations hold connection state and
/// therefore take `&mut self`.
#[async_trait]
pub trait SymbolicOracle: Send {
    /// Strengthen the path condition with definedness of every partial operation in `state`
    async fn assume_defined(&mut self, state: &SymbolicState) -> OracleResult<SymbolicState>;

    /// Advance `state` by at most `max_depth` rewrite steps
    async fn step(&mut self, state: &SymbolicState, max_depth: u32) -> OracleResult<StepResult>;

    /// Whether every instance of `antecedent` is an instance of `consequent`
    async fn implies(
        &mut self,
        antecedent: &SymbolicState,
        consequent: &SymbolicState,
    ) -> OracleResult<bool>;

    /// Release the session; further calls are an error
    async fn shutdown(&mut self) -> OracleResult<()> {
        Ok(())
    }
}

/// Starts oracle sessions for a compiled semantics
#[async_trait]
pub trait OracleLauncher: Send + Sync {
    type Session: SymbolicOracle;

    async fn start(&self, semantics: &SemanticsHandle) -> OracleResult<Self::Session>;
}

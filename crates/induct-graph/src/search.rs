//! Breadth-first proof search
//!
//! One iteration takes the oldest open node and asks the oracle about it:
//!
//! 1. If the goal subsumes the node, it becomes `Target` and is covered.
//! 2. Otherwise the node is executed for at most `execute_depth` steps.
//!    Successors become new `Pending` nodes and the node becomes `Frontier`;
//!    no successors makes it `Stuck`; an infeasible path makes it a vacuous `Target`.
//!
//! The search stops when no open node remains, when `max_iterations` nodes
//! have been processed, or (with `fail_fast`) at the first stuck node.

use crate::error::{GraphError, GraphResult};
use crate::graph::{NodeId, NodeStatus, ProofGraph, SearchOutcome};
use induct_oracle::{StepResult, SymbolicOracle};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info, instrument, warn};

/// Bounds on one proof search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Nodes processed before the search gives up with `Incomplete`
    pub max_iterations: usize,
    /// Rewrite steps per `execute` call
    pub execute_depth: u32,
    /// Stop at the first stuck node
    pub fail_fast: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            execute_depth: 100,
            fail_fast: false,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub fn with_execute_depth(mut self, execute_depth: u32) -> Self {
        self.execute_depth = execute_depth;
        self
    }

    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

/// What happened to one node in one iteration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    Covered,
    Extended(Vec<NodeId>),
    Stuck,
    Vacuous,
}

/// A proof search over one graph with one oracle session
pub struct ProofSearch<'o, O: SymbolicOracle + ?Sized> {
    graph: ProofGraph,
    oracle: &'o mut O,
    config: SearchConfig,
    queue: VecDeque<NodeId>,
    iterations: usize,
    initialized: bool,
}

impl<'o, O: SymbolicOracle + ?Sized> ProofSearch<'o, O> {
    pub fn new(graph: ProofGraph, oracle: &'o mut O, config: SearchConfig) -> Self {
        let queue = graph.open_nodes().into_iter().collect();
        Self {
            graph,
            oracle,
            config,
            queue,
            iterations: 0,
            initialized: false,
        }
    }

    /// Strengthen the initial node with definedness conditions
    #[instrument(skip_all)]
    pub async fn initialize(&mut self) -> GraphResult<()> {
        let init = self.graph.init();
        let state = self.graph.node(init)?.state.clone();
        let defined = self.oracle.assume_defined(&state).await?;
        debug!(
            added = defined.constraints.len().saturating_sub(state.constraints.len()),
            "Assumed definedness of initial state"
        );
        self.graph.replace_state(init, defined)?;
        self.initialized = true;
        Ok(())
    }

    /// Run until the graph is closed or a bound is hit
    #[instrument(skip_all, fields(max_iterations = self.config.max_iterations))]
    pub async fn advance(&mut self) -> GraphResult<SearchOutcome> {
        if !self.initialized {
            return Err(GraphError::NotInitialized);
        }
        while self.iterations < self.config.max_iterations {
            let Some(id) = self.queue.pop_front() else {
                break;
            };
            self.iterations += 1;
            let expansion = self.expand(id).await?;
            debug!(node = %id, iteration = self.iterations, ?expansion, "Processed node");

            if expansion == Expansion::Stuck && self.config.fail_fast {
                warn!(node = %id, "Stopping at first stuck node");
                break;
            }
        }

        let outcome = self.graph.outcome();
        if let SearchOutcome::Incomplete { remaining } = &outcome {
            if self.iterations >= self.config.max_iterations {
                warn!(
                    iterations = self.iterations,
                    remaining = remaining.len(),
                    "Iteration bound reached"
                );
            }
        }
        info!(iterations = self.iterations, summary = %self.graph.summary(), "Search finished");
        Ok(outcome)
    }

    /// One oracle round trip for `id`
    async fn expand(&mut self, id: NodeId) -> GraphResult<Expansion> {
        let target = self.graph.target();
        let state = self.graph.node(id)?.state.clone();
        let goal = self.graph.node(target)?.state.clone();

        if self.oracle.implies(&state, &goal).await? {
            self.graph.cover(id)?;
            return Ok(Expansion::Covered);
        }

        match self.oracle.step(&state, self.config.execute_depth).await? {
            StepResult::Successors(successors) if !successors.is_empty() => {
                let mut children = Vec::with_capacity(successors.len());
                for successor in successors {
                    let child = self.graph.add_successor(id, successor)?;
                    self.queue.push_back(child);
                    children.push(child);
                }
                self.graph.set_status(id, NodeStatus::Frontier)?;
                Ok(Expansion::Extended(children))
            }
            StepResult::Successors(_) | StepResult::Stuck => {
                self.graph.set_status(id, NodeStatus::Stuck)?;
                Ok(Expansion::Stuck)
            }
            StepResult::Vacuous => {
                self.graph.mark_vacuous(id)?;
                Ok(Expansion::Vacuous)
            }
        }
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn graph(&self) -> &ProofGraph {
        &self.graph
    }

    pub fn into_graph(self) -> ProofGraph {
        self.graph
    }
}

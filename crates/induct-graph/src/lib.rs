//! Proof graph for reachability claims
//!
//! A [`ProofGraph`] is built from a claim: the initial node is the claim's
//! left-hand side under `requires`, the target node its right-hand side under
//! `ensures`. [`ProofSearch`] expands open nodes breadth-first through a
//! [`SymbolicOracle`](induct_oracle::SymbolicOracle) until every branch is
//! closed or a bound is hit, and [`ProofGraph::outcome`] reads the verdict
//! off the node states.

pub mod error;
pub mod graph;
pub mod search;

pub use error::{GraphError, GraphResult};
pub use graph::{
    Cover, Edge, GraphSummary, Node, NodeId, NodeStatus, ProofGraph, SearchOutcome,
};
pub use search::{Expansion, ProofSearch, SearchConfig};

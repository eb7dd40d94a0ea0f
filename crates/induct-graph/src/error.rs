//! Error types for the proof graph

use crate::graph::NodeId;
use induct_oracle::OracleError;
use thiserror::Error;

pub type GraphResult<T> = Result<T, GraphError>;

#[derive(Debug, Error)]
pub enum GraphError {
    /// The claim body has no `lhs => rhs` node to split into init and target
    #[error("claim body contains no rewrite: {0}")]
    NoRewrite(String),

    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// The search was advanced before `initialize`
    #[error("proof search not initialized")]
    NotInitialized,

    /// The oracle failed; the attempt is over
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl GraphError {
    pub fn kind(&self) -> &'static str {
        match self {
            GraphError::NoRewrite(_) => "UnexpectedClaimShape",
            GraphError::UnknownNode(_) | GraphError::NotInitialized => "InternalError",
            GraphError::Oracle(e) => e.kind(),
        }
    }
}

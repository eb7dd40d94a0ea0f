//! Error types for the proof driver

use induct_graph::GraphError;
use induct_oracle::OracleError;
use induct_transform::TransformError;
use std::path::PathBuf;
use thiserror::Error;

pub type InductResult<T> = Result<T, InductError>;

#[derive(Debug, Error)]
pub enum InductError {
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// The external compiler rejected its input; `stderr` is its output verbatim
    #[error("compilation of {main_module} failed ({status}):\n{stderr}")]
    CompilationFailed {
        main_module: String,
        status: String,
        stderr: String,
    },

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    /// No claim, or more than one, matches the selection
    #[error("claim selection: {0}")]
    ClaimSelection(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl InductError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InductError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        InductError::Json {
            path: path.into(),
            source,
        }
    }

    /// Short name of the failure, printed by the CLI
    pub fn kind(&self) -> &'static str {
        match self {
            InductError::Transform(e) => e.kind(),
            InductError::CompilationFailed { .. } => "CompilationFailed",
            InductError::Oracle(e) => e.kind(),
            InductError::Graph(e) => e.kind(),
            InductError::ClaimSelection(_) => "ClaimSelection",
            InductError::Config(_) => "ConfigurationError",
            InductError::Io { .. } => "IoError",
            InductError::Json { .. } => "JsonError",
        }
    }

    /// Errors that stop the attempt before any search starts.
    ///
    /// These become a `ConfigurationError` verdict; everything else aborts the attempt.
    pub fn is_configuration(&self) -> bool {
        match self {
            InductError::Transform(_)
            | InductError::CompilationFailed { .. }
            | InductError::ClaimSelection(_)
            | InductError::Config(_)
            | InductError::Io { .. }
            | InductError::Json { .. } => true,
            InductError::Graph(GraphError::NoRewrite(_)) => true,
            InductError::Oracle(_) | InductError::Graph(_) => false,
        }
    }
}

//! Error types for the induction transform

use induct_term::{AnnotationError, ModuleError};
use thiserror::Error;

/// Result type for transform operations
pub type TransformResult<T> = Result<T, TransformError>;

/// Reasons a claim cannot be turned into induction artifacts.
///
/// All of these are fatal for the claim: nothing is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// Missing, duplicated or ill-shaped `decreases` annotation
    #[error(transparent)]
    MalformedAnnotation(#[from] AnnotationError),

    /// The induction variable's sort cannot be determined
    #[error("cannot determine the sort of induction variable `{variable}`: {reason}")]
    VariableSortUnresolved { variable: String, reason: String },

    /// The claim body is not in step-sequence form
    #[error("unexpected claim shape: {0}")]
    UnexpectedClaimShape(String),

    /// The generated module bundle does not form an import DAG
    #[error("generated modules are inconsistent: {0}")]
    InvalidModules(#[from] ModuleError),
}

impl TransformError {
    pub fn sort_unresolved(variable: impl Into<String>, reason: impl Into<String>) -> Self {
        TransformError::VariableSortUnresolved {
            variable: variable.into(),
            reason: reason.into(),
        }
    }

    pub fn shape(message: impl Into<String>) -> Self {
        TransformError::UnexpectedClaimShape(message.into())
    }

    /// Short name of the error kind, used in CLI output
    pub fn kind(&self) -> &'static str {
        match self {
            TransformError::MalformedAnnotation(_) => "MalformedAnnotation",
            TransformError::VariableSortUnresolved { .. } => "VariableSortUnresolved",
            TransformError::UnexpectedClaimShape(_) => "UnexpectedClaimShape",
            TransformError::InvalidModules(_) => "InvalidModules",
        }
    }
}

//! Error types for the term model

use thiserror::Error;

/// A `decreases` annotation that does not have the `"<var>, <measure>, <floor>"` shape
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed decreases annotation `{value}`: {reason}")]
pub struct AnnotationError {
    /// The raw annotation text
    pub value: String,
    pub reason: String,
}

impl AnnotationError {
    pub fn new(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Errors in the import structure of a module bundle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    #[error("module {module} imports unknown module {import}")]
    UnknownImport { module: String, import: String },

    #[error("import cycle: {}", .cycle.join(" -> "))]
    ImportCycle { cycle: Vec<String> },

    #[error("module {0} is defined more than once")]
    DuplicateModule(String),

    #[error("main module {0} is not part of the definition")]
    MissingMainModule(String),
}

//! Driver configuration
//!
//! Every path the driver touches is derived from one root directory:
//!
//! ```text
//! <root>/
//!   induction/k-src/imp.md              base semantics
//!   induction/k-src/sum-to-n-spec.json  claims
//!   .build/definition/imp-kompiled      compiled base semantics
//!   .build/work/                        generated bundle, claim module, proof graph
//!   .build/bug-report/                  oracle session logs
//! ```

use crate::compiler::CompilerConfig;
use crate::error::{InductError, InductResult};
use induct_graph::SearchConfig;
use induct_oracle::OracleConfig;
use induct_transform::TransformConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InductConfig {
    /// Directory every relative path is resolved against
    pub root: PathBuf,

    /// Base semantics source, relative to `root`
    pub semantics_source: PathBuf,

    /// JSON file holding the annotated claims, relative to `root`
    pub claim_source: PathBuf,

    /// Label of the claim to prove when the source holds more than one
    pub claim_label: Option<String>,

    /// Compile the base semantics before anything else
    pub compile_base: bool,

    /// Log every oracle request and response under `.build/bug-report`
    pub bug_report: bool,

    pub transform: TransformConfig,
    pub search: SearchConfig,
    pub oracle: OracleConfig,
    pub compiler: CompilerConfig,
}

impl Default for InductConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            semantics_source: PathBuf::from("induction/k-src/imp.md"),
            claim_source: PathBuf::from("induction/k-src/sum-to-n-spec.json"),
            claim_label: None,
            compile_base: true,
            bug_report: false,
            transform: TransformConfig::default(),
            search: SearchConfig::default(),
            oracle: OracleConfig::default(),
            compiler: CompilerConfig::default(),
        }
    }
}

impl InductConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> InductResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| InductError::io(path, e))?;
        serde_json::from_str(&text).map_err(|e| InductError::json(path, e))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn semantics_source_path(&self) -> PathBuf {
        self.resolve(&self.semantics_source)
    }

    pub fn claim_source_path(&self) -> PathBuf {
        self.resolve(&self.claim_source)
    }

    pub fn build_dir(&self) -> PathBuf {
        self.root.join(".build")
    }

    /// Output of the base semantics compilation
    pub fn definition_dir(&self) -> PathBuf {
        self.build_dir().join("definition").join("imp-kompiled")
    }

    pub fn work_dir(&self) -> PathBuf {
        self.build_dir().join("work")
    }

    pub fn bug_report_dir(&self) -> PathBuf {
        self.build_dir().join("bug-report")
    }

    /// Serialised induction definition handed to the compiler
    pub fn bundle_path(&self) -> PathBuf {
        self.work_dir()
            .join(format!("{}.json", self.transform.semantics_name))
    }

    /// Serialised module wrapping the inductive-step claim
    pub fn claim_module_path(&self) -> PathBuf {
        self.work_dir()
            .join(format!("{}-spec.json", self.transform.semantics_name))
    }

    /// Output of the induction definition compilation
    pub fn induction_definition_dir(&self) -> PathBuf {
        self.work_dir().join("induction-kompile")
    }

    pub fn graph_path(&self) -> PathBuf {
        self.work_dir().join("proof-graph.json")
    }

    /// Oracle settings with the bug-report directory filled in when enabled
    pub fn effective_oracle(&self) -> OracleConfig {
        let mut oracle = self.oracle.clone();
        if self.bug_report && oracle.bug_report.is_none() {
            oracle.bug_report = Some(self.bug_report_dir());
        }
        oracle
    }

    pub fn validate(&self) -> InductResult<()> {
        if self.search.max_iterations == 0 {
            return Err(InductError::Config("search.max_iterations must be positive".into()));
        }
        if self.search.execute_depth == 0 {
            return Err(InductError::Config("search.execute_depth must be positive".into()));
        }
        if self.transform.semantics_name.is_empty() {
            return Err(InductError::Config("transform.semantics_name is empty".into()));
        }
        Ok(())
    }
}

/// Builder for InductConfig
#[derive(Debug, Default)]
pub struct InductConfigBuilder {
    config: InductConfig,
}

impl InductConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn from_config(config: InductConfig) -> Self {
        Self { config }
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.root = root.into();
        self
    }

    pub fn semantics_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.semantics_source = path.into();
        self
    }

    pub fn claim_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.claim_source = path.into();
        self
    }

    pub fn claim_label(mut self, label: impl Into<String>) -> Self {
        self.config.claim_label = Some(label.into());
        self
    }

    pub fn compile_base(mut self, enabled: bool) -> Self {
        self.config.compile_base = enabled;
        self
    }

    pub fn bug_report(mut self, enabled: bool) -> Self {
        self.config.bug_report = enabled;
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.search.max_iterations = max;
        self
    }

    pub fn transform(mut self, transform: TransformConfig) -> Self {
        self.config.transform = transform;
        self
    }

    pub fn search(mut self, search: SearchConfig) -> Self {
        self.config.search = search;
        self
    }

    pub fn oracle(mut self, oracle: OracleConfig) -> Self {
        self.config.oracle = oracle;
        self
    }

    pub fn compiler(mut self, compiler: CompilerConfig) -> Self {
        self.config.compiler = compiler;
        self
    }

    pub fn build(self) -> InductConfig {
        self.config
    }
}

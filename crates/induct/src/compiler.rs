//! Semantics compiler interface
//!
//! Compiling a definition into something the oracle can execute is an
//! external job. The driver only needs one blocking operation: compile a
//! source with a main and syntax module into an output directory.

use crate::error::{InductError, InductResult};
use async_trait::async_trait;
use induct_oracle::config::resolve_executable;
use induct_oracle::SemanticsHandle;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// One compilation job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileRequest {
    /// Source file: the base semantics, or a serialised definition bundle
    pub source: PathBuf,
    pub main_module: String,
    pub syntax_module: String,
    pub output_dir: PathBuf,
    /// Markdown code-block selector, for literate sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md_selector: Option<String>,
}

#[async_trait]
pub trait SemanticsCompiler: Send + Sync {
    async fn compile(&self, request: &CompileRequest) -> InductResult<SemanticsHandle>;
}

/// How to invoke the external compiler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Compiler executable; a bare name is looked up on `PATH`
    pub binary: PathBuf,
    pub backend: String,
    /// Selector passed when compiling the base semantics
    pub md_selector: Option<String>,
    pub extra_args: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("kompile"),
            backend: "haskell".to_string(),
            md_selector: Some("k".to_string()),
            extra_args: Vec::new(),
        }
    }
}

/// Runs the configured compiler as a child process
#[derive(Debug, Clone, Default)]
pub struct ExternalCompiler {
    config: CompilerConfig,
}

impl ExternalCompiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    fn command(&self, binary: PathBuf, request: &CompileRequest) -> Command {
        let mut cmd = Command::new(binary);
        cmd.arg(&request.source)
            .arg("--backend")
            .arg(&self.config.backend)
            .arg("--main-module")
            .arg(&request.main_module)
            .arg("--syntax-module")
            .arg(&request.syntax_module)
            .arg("--output-definition")
            .arg(&request.output_dir);
        if let Some(selector) = &request.md_selector {
            cmd.arg("--md-selector").arg(selector);
        }
        cmd.args(&self.config.extra_args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

#[async_trait]
impl SemanticsCompiler for ExternalCompiler {
    #[instrument(skip_all, fields(main = %request.main_module))]
    async fn compile(&self, request: &CompileRequest) -> InductResult<SemanticsHandle> {
        let binary = resolve_executable(&self.config.binary)
            .map_err(|e| InductError::Config(format!("compiler: {e}")))?;
        if let Some(parent) = request.output_dir.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| InductError::io(parent, e))?;
        }

        info!(source = %request.source.display(), "Compiling");
        let start = Instant::now();
        let output = self
            .command(binary.clone(), request)
            .output()
            .await
            .map_err(|e| InductError::io(&binary, e))?;
        debug!(elapsed = ?start.elapsed(), status = %output.status, "Compiler exited");

        if !output.status.success() {
            return Err(InductError::CompilationFailed {
                main_module: request.main_module.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        info!(output = %request.output_dir.display(), "Compilation done");
        Ok(SemanticsHandle {
            definition_dir: request.output_dir.clone(),
            main_module: request.main_module.clone(),
            syntax_module: request.syntax_module.clone(),
        })
    }
}

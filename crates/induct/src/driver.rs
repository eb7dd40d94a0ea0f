//! End-to-end proof attempt for one claim
//!
//! ```text
//! compile base semantics
//!   -> load and select claim
//!   -> induction transform
//!   -> write bundle + claim module
//!   -> compile induction definition
//!   -> start oracle session
//!   -> proof search
//!   -> write proof graph, shut the session down
//! ```

use crate::claims::{load_claims, select_claim};
use crate::compiler::{CompileRequest, ExternalCompiler, SemanticsCompiler};
use crate::config::InductConfig;
use crate::error::{InductError, InductResult};
use crate::report::{ProofReport, ProofVerdict};
use chrono::{DateTime, Utc};
use induct_graph::{ProofGraph, ProofSearch, SearchConfig, SearchOutcome};
use induct_oracle::{OracleLauncher, SemanticsHandle, ServerLauncher, SymbolicOracle};
use induct_term::Claim;
use induct_transform::{InductionArtifacts, InductionTransform};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Runs proof attempts with a given compiler and oracle launcher
pub struct ProofDriver<C, L> {
    config: InductConfig,
    compiler: C,
    launcher: L,
}

impl ProofDriver<ExternalCompiler, ServerLauncher> {
    /// Driver using the configured external compiler and oracle server
    pub fn from_config(config: InductConfig) -> Self {
        let compiler = ExternalCompiler::new(config.compiler.clone());
        let launcher = ServerLauncher::new(config.effective_oracle());
        Self::new(config, compiler, launcher)
    }
}

/// Finished search: verdict, work done, final graph
struct SearchRun {
    outcome: SearchOutcome,
    iterations: usize,
    graph: ProofGraph,
}

impl<C: SemanticsCompiler, L: OracleLauncher> ProofDriver<C, L> {
    pub fn new(config: InductConfig, compiler: C, launcher: L) -> Self {
        Self {
            config,
            compiler,
            launcher,
        }
    }

    pub fn config(&self) -> &InductConfig {
        &self.config
    }

    /// Like [`run`](Self::run), but errors raised before the search starts
    /// become a [`ProofVerdict::ConfigurationError`] report.
    pub async fn prove(&self) -> InductResult<ProofReport> {
        let started_at = Utc::now();
        let start = Instant::now();
        match self.attempt(started_at, start).await {
            Err(e) if e.is_configuration() => {
                warn!(kind = e.kind(), error = %e, "Proof attempt rejected");
                Ok(ProofReport::configuration_error(
                    self.config.claim_label.clone(),
                    format!("{}: {e}", e.kind()),
                    started_at,
                    start.elapsed(),
                ))
            }
            other => other,
        }
    }

    /// Run the whole pipeline; every failure is returned as an error
    pub async fn run(&self) -> InductResult<ProofReport> {
        self.attempt(Utc::now(), Instant::now()).await
    }

    #[instrument(skip_all, fields(root = %self.config.root.display()))]
    async fn attempt(&self, started_at: DateTime<Utc>, start: Instant) -> InductResult<ProofReport> {
        self.config.validate()?;
        let transform = InductionTransform::new(self.config.transform.clone());

        if self.config.compile_base {
            self.compile_base().await?;
        }

        let claims = load_claims(&self.config.claim_source_path())?;
        let claim = select_claim(claims, self.config.claim_label.as_deref())?;
        let label = claim.label.clone();
        info!(claim = label.as_deref().unwrap_or("<unlabelled>"), body = %claim.body, "Selected claim");

        let artifacts = transform.apply(&claim)?;
        info!(
            witness = %artifacts.witness,
            requires = %artifacts.claim.requires,
            ensures = %artifacts.claim.ensures,
            "Inductive step claim: {}",
            artifacts.claim.body
        );
        self.write_artifacts(&artifacts).await?;

        let semantics = self.compile_induction(&transform).await?;
        let run = self.search(&semantics, &artifacts.claim).await?;

        let graph_path = self.config.graph_path();
        write_json(&graph_path, &run.graph).await?;
        if let SearchOutcome::Disproved { stuck } = &run.outcome {
            for &id in stuck {
                if let Ok(path) = run.graph.path_to(id) {
                    let trace: Vec<String> = path.iter().map(ToString::to_string).collect();
                    warn!(node = %id, path = %trace.join(" -> "), "Stuck branch");
                }
            }
        }

        let report = ProofReport {
            claim: label,
            verdict: ProofVerdict::from(run.outcome),
            started_at,
            duration: start.elapsed(),
            iterations: run.iterations,
            summary: run.graph.summary(),
            graph_path: Some(graph_path),
        };
        info!(verdict = %report.verdict, iterations = report.iterations, "Proof attempt finished");
        Ok(report)
    }

    async fn compile_base(&self) -> InductResult<SemanticsHandle> {
        let request = CompileRequest {
            source: self.config.semantics_source_path(),
            main_module: self.config.transform.base_main_module.clone(),
            syntax_module: self.config.transform.base_syntax_module.clone(),
            output_dir: self.config.definition_dir(),
            md_selector: self.config.compiler.md_selector.clone(),
        };
        self.compiler.compile(&request).await
    }

    async fn compile_induction(&self, transform: &InductionTransform) -> InductResult<SemanticsHandle> {
        let request = CompileRequest {
            source: self.config.bundle_path(),
            main_module: transform.config().semantics_module_name(),
            syntax_module: transform.config().syntax_module_name(),
            output_dir: self.config.induction_definition_dir(),
            md_selector: None,
        };
        self.compiler.compile(&request).await
    }

    async fn write_artifacts(&self, artifacts: &InductionArtifacts) -> InductResult<()> {
        let work_dir = self.config.work_dir();
        tokio::fs::create_dir_all(&work_dir)
            .await
            .map_err(|e| InductError::io(&work_dir, e))?;
        write_json(&self.config.bundle_path(), &artifacts.definition).await?;
        write_json(&self.config.claim_module_path(), &artifacts.claim_module).await?;
        debug!(dir = %work_dir.display(), "Wrote induction definition and claim module");
        Ok(())
    }

    /// The session is shut down whether or not the search succeeds
    async fn search(&self, semantics: &SemanticsHandle, claim: &Claim) -> InductResult<SearchRun> {
        let mut session = self.launcher.start(semantics).await?;
        let result = search_with(&mut session, claim, self.config.search).await;
        if let Err(e) = session.shutdown().await {
            warn!(error = %e, "Oracle shutdown failed");
        }
        result
    }
}

async fn search_with<O: SymbolicOracle + ?Sized>(
    oracle: &mut O,
    claim: &Claim,
    config: SearchConfig,
) -> InductResult<SearchRun> {
    let graph = ProofGraph::from_claim(claim)?;
    let mut search = ProofSearch::new(graph, oracle, config);
    search.initialize().await?;
    let outcome = search.advance().await?;
    let iterations = search.iterations();
    Ok(SearchRun {
        outcome,
        iterations,
        graph: search.into_graph(),
    })
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> InductResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| InductError::json(path, e))?;
    tokio::fs::write(path, text)
        .await
        .map_err(|e| InductError::io(path, e))
}

//! Verdicts and run reports

use chrono::{DateTime, Utc};
use induct_graph::{GraphSummary, NodeId, SearchOutcome};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Final answer for one claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "detail", rename_all = "kebab-case")]
pub enum ProofVerdict {
    Proved,
    /// Stuck nodes: branches that cannot reach the goal
    Disproved(Vec<NodeId>),
    /// Nodes still open when the iteration bound was reached
    Incomplete(Vec<NodeId>),
    /// The claim or its environment could not be processed
    ConfigurationError(String),
}

impl ProofVerdict {
    pub fn exit_code(&self) -> i32 {
        match self {
            ProofVerdict::Proved => 0,
            ProofVerdict::Disproved(_) => 1,
            ProofVerdict::Incomplete(_) => 2,
            ProofVerdict::ConfigurationError(_) => 3,
        }
    }

    pub fn is_proved(&self) -> bool {
        matches!(self, ProofVerdict::Proved)
    }

    /// Failure kind, as printed by the CLI
    pub fn kind(&self) -> &'static str {
        match self {
            ProofVerdict::Proved => "Proved",
            ProofVerdict::Disproved(_) => "Stuck",
            ProofVerdict::Incomplete(_) => "Incomplete",
            ProofVerdict::ConfigurationError(_) => "ConfigurationError",
        }
    }
}

impl From<SearchOutcome> for ProofVerdict {
    fn from(outcome: SearchOutcome) -> Self {
        match outcome {
            SearchOutcome::Proved => ProofVerdict::Proved,
            SearchOutcome::Disproved { stuck } => ProofVerdict::Disproved(stuck),
            SearchOutcome::Incomplete { remaining } => ProofVerdict::Incomplete(remaining),
        }
    }
}

fn join_nodes(nodes: &[NodeId]) -> String {
    nodes
        .iter()
        .map(NodeId::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for ProofVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProofVerdict::Proved => write!(f, "proved"),
            ProofVerdict::Disproved(nodes) => write!(f, "stuck at {}", join_nodes(nodes)),
            ProofVerdict::Incomplete(nodes) => {
                write!(f, "incomplete, {} open node(s): {}", nodes.len(), join_nodes(nodes))
            }
            ProofVerdict::ConfigurationError(reason) => write!(f, "configuration error: {reason}"),
        }
    }
}

/// Everything known about one proof attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofReport {
    pub claim: Option<String>,
    pub verdict: ProofVerdict,
    pub started_at: DateTime<Utc>,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
    pub iterations: usize,
    pub summary: GraphSummary,
    /// Where the final proof graph was written
    pub graph_path: Option<PathBuf>,
}

impl ProofReport {
    /// A report for an attempt that never reached the search
    pub fn configuration_error(
        claim: Option<String>,
        reason: impl Into<String>,
        started_at: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        Self {
            claim,
            verdict: ProofVerdict::ConfigurationError(reason.into()),
            started_at,
            duration,
            iterations: 0,
            summary: GraphSummary::default(),
            graph_path: None,
        }
    }
}

impl fmt::Display for ProofReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {}",
            self.claim.as_deref().unwrap_or("<unlabelled claim>"),
            self.verdict
        )?;
        writeln!(
            f,
            "  {} iteration(s) in {:.2}s",
            self.iterations,
            self.duration.as_secs_f64()
        )?;
        write!(f, "  graph: {}", self.summary)?;
        if let Some(path) = &self.graph_path {
            write!(f, "\n  saved to {}", path.display())?;
        }
        Ok(())
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

//! induct command line
//!
//! Exit status: 0 proved, 1 stuck, 2 incomplete, 3 configuration error,
//! 4 the attempt was aborted by an oracle failure.

use anyhow::Context;
use clap::Parser;
use induct::{InductConfig, InductConfigBuilder, ProofDriver};
use induct_oracle::DEBUG_PORT;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

const EXIT_CONFIGURATION: u8 = 3;
const EXIT_ABORTED: u8 = 4;

/// Prove a reachability claim by well-founded induction on its decreases annotation
#[derive(Parser, Debug)]
#[command(name = "induct")]
#[command(version)]
struct Args {
    /// JSON configuration file
    #[arg(short, long, env = "INDUCT_CONFIG")]
    config: Option<PathBuf>,

    /// Project root; overrides the configuration file
    #[arg(long, env = "INDUCT_ROOT")]
    root: Option<PathBuf>,

    /// Label of the claim to prove
    #[arg(long)]
    claim: Option<String>,

    /// Claim file, relative to the root
    #[arg(long)]
    claim_source: Option<PathBuf>,

    /// Bound on proof-search iterations
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Skip compiling the base semantics (reuse `.build/definition`)
    #[arg(long)]
    no_compile_base: bool,

    /// Log every oracle message under `.build/bug-report`
    #[arg(long)]
    bug_report: bool,

    /// Attach to an oracle already listening on the debug port instead of spawning one
    #[arg(long)]
    debug_server: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn into_config(self) -> anyhow::Result<InductConfig> {
        let base = match &self.config {
            Some(path) => InductConfig::load(path)
                .with_context(|| format!("loading configuration {}", path.display()))?,
            None => InductConfig::default(),
        };
        let mut builder = InductConfigBuilder::from_config(base);
        if let Some(root) = self.root {
            builder = builder.root(root);
        }
        if let Some(label) = self.claim {
            builder = builder.claim_label(label);
        }
        if let Some(source) = self.claim_source {
            builder = builder.claim_source(source);
        }
        if let Some(max) = self.max_iterations {
            builder = builder.max_iterations(max);
        }
        if self.no_compile_base {
            builder = builder.compile_base(false);
        }
        if self.bug_report {
            builder = builder.bug_report(true);
        }
        let mut config = builder.build();
        if self.debug_server {
            config.oracle.port = Some(DEBUG_PORT);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    ExitCode::from(run(args).await)
}

async fn run(args: Args) -> u8 {
    let json = args.json;
    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Configuration rejected");
            eprintln!("ConfigurationError: {e:#}");
            return EXIT_CONFIGURATION;
        }
    };
    info!(root = %config.root.display(), "Starting proof attempt");

    let report = match ProofDriver::from_config(config).prove().await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Proof attempt aborted");
            eprintln!("{}: {e}", e.kind());
            return EXIT_ABORTED;
        }
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                error!(error = %e, "Report serialization failed");
                eprintln!("JsonError: {e}");
                return EXIT_ABORTED;
            }
        }
    } else {
        println!("{report}");
    }
    if !report.verdict.is_proved() {
        eprintln!("{}", report.verdict.kind());
    }
    u8::try_from(report.verdict.exit_code()).unwrap_or(EXIT_ABORTED)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["induct"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[tokio::test]
    async fn test_unreadable_config_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let code = run(args(&["--config", missing.to_str().unwrap()])).await;
        assert_eq!(code, EXIT_CONFIGURATION);

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        let code = run(args(&["--config", broken.to_str().unwrap()])).await;
        assert_eq!(code, EXIT_CONFIGURATION);
    }

    #[tokio::test]
    async fn test_missing_claim_file_exits_with_configuration_code() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        let code = run(args(&["--root", root, "--no-compile-base"])).await;
        assert_eq!(code, EXIT_CONFIGURATION);
    }

    #[test]
    fn test_debug_server_uses_the_fixed_port() {
        let config = args(&["--debug-server", "--max-iterations", "7"])
            .into_config()
            .unwrap();
        assert_eq!(config.oracle.port, Some(DEBUG_PORT));
        assert_eq!(config.search.max_iterations, 7);
    }
}

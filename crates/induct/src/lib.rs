//! Proof driver for decreases-annotated reachability claims
//!
//! [`ProofDriver`] ties the pipeline together: the base semantics and the
//! generated induction definition are compiled by a [`SemanticsCompiler`],
//! the inductive-step claim is searched with an oracle session from an
//! [`OracleLauncher`](induct_oracle::OracleLauncher), and the result is a
//! [`ProofReport`].
//!
//! ```no_run
//! use induct::{InductConfigBuilder, ProofDriver};
//!
//! # async fn demo() -> induct::InductResult<()> {
//! let config = InductConfigBuilder::new()
//!     .root("/path/to/project")
//!     .claim_label("sum-to-n")
//!     .build();
//! let report = ProofDriver::from_config(config).prove().await?;
//! println!("{report}");
//! std::process::exit(report.verdict.exit_code());
//! # }
//! ```

pub mod claims;
pub mod compiler;
pub mod config;
pub mod driver;
pub mod error;
pub mod report;

pub use claims::{load_claims, select_claim};
pub use compiler::{CompileRequest, CompilerConfig, ExternalCompiler, SemanticsCompiler};
pub use config::{InductConfig, InductConfigBuilder};
pub use driver::ProofDriver;
pub use error::{InductError, InductResult};
pub use report::{ProofReport, ProofVerdict};

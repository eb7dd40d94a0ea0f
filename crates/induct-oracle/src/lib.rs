//! Oracle client for induct
//!
//! The proof search never rewrites terms itself. It asks an external
//! symbolic-execution server, the oracle, to
//!
//! - strengthen a state with definedness conditions (`assume-defined`),
//! - advance a state by a bounded number of rewrite steps (`execute`),
//! - decide whether one state subsumes another (`implies`).
//!
//! [`SymbolicOracle`] is that capability. [`OracleSession`] implements it by
//! spawning the server, speaking JSON-RPC 2.0 to it over line-delimited TCP,
//! and killing it when the session ends.

pub mod bug_report;
pub mod client;
pub mod config;
pub mod error;
pub mod oracle;
pub mod rpc;
pub mod session;

pub use bug_report::BugReport;
pub use client::RpcClient;
pub use config::{OracleConfig, OracleConfigBuilder, DEBUG_PORT};
pub use error::{OracleError, OracleResult};
pub use oracle::{OracleLauncher, SemanticsHandle, StepLabel, StepResult, Successor, SymbolicOracle};
pub use session::{OracleSession, ServerLauncher};

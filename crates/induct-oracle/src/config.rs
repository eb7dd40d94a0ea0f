//! Oracle session configuration

use crate::error::{OracleError, OracleResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Port of a manually started debug server
pub const DEBUG_PORT: u16 = 39425;

/// How to reach the oracle server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Server executable; a bare name is looked up on `PATH`
    pub server_binary: PathBuf,

    /// Extra arguments appended to the server command line
    pub extra_args: Vec<String>,

    pub host: String,

    /// Connect to an already running server on this port instead of spawning one
    pub port: Option<u16>,

    /// How long to wait for a freshly spawned server to accept connections
    pub startup_timeout_ms: u64,

    /// Delay between connection attempts during startup
    pub connect_retry_ms: u64,

    /// Upper bound on a single request/response round trip
    pub request_timeout_ms: u64,

    /// Directory receiving a JSON-lines log of every request and response
    pub bug_report: Option<PathBuf>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            server_binary: PathBuf::from("kore-rpc"),
            extra_args: Vec::new(),
            host: "127.0.0.1".to_string(),
            port: None,
            startup_timeout_ms: 30_000,
            connect_retry_ms: 100,
            request_timeout_ms: 300_000,
            bug_report: None,
        }
    }
}

impl OracleConfig {
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }

    pub fn connect_retry(&self) -> Duration {
        Duration::from_millis(self.connect_retry_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Whether this config attaches to a running debug server
    pub fn is_attached(&self) -> bool {
        self.port.is_some()
    }

    /// Absolute path of the server executable
    pub fn resolve_binary(&self) -> OracleResult<PathBuf> {
        resolve_executable(&self.server_binary)
    }
}

/// Bare names go through `PATH`; anything with a directory component is used as is
pub fn resolve_executable(binary: &Path) -> OracleResult<PathBuf> {
    if binary.components().count() > 1 || binary.is_absolute() {
        if binary.exists() {
            return Ok(binary.to_path_buf());
        }
        return Err(OracleError::unavailable(format!(
            "server binary {} does not exist",
            binary.display()
        )));
    }
    which::which(binary).map_err(|e| {
        OracleError::unavailable(format!(
            "server binary {} not found on PATH: {e}",
            binary.display()
        ))
    })
}

/// Builder for OracleConfig
#[derive(Debug, Default)]
pub struct OracleConfigBuilder {
    config: OracleConfig,
}

impl OracleConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.server_binary = path.into();
        self
    }

    pub fn extra_arg(mut self, arg: impl Into<String>) -> Self {
        self.config.extra_args.push(arg.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = Some(port);
        self
    }

    /// Attach to the debug server on [`DEBUG_PORT`]
    pub fn debug_server(self) -> Self {
        self.port(DEBUG_PORT)
    }

    pub fn startup_timeout(mut self, timeout: Duration) -> Self {
        self.config.startup_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn bug_report(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.bug_report = Some(dir.into());
        self
    }

    pub fn build(self) -> OracleConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OracleConfig::default();
        assert!(!config.is_attached());
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.startup_timeout(), Duration::from_secs(30));
        assert!(config.bug_report.is_none());
    }

    #[test]
    fn test_builder() {
        let config = OracleConfigBuilder::new()
            .server_binary("/opt/k/bin/kore-rpc")
            .extra_arg("--log-level")
            .extra_arg("debug")
            .debug_server()
            .request_timeout(Duration::from_secs(5))
            .bug_report("/tmp/report")
            .build();
        assert_eq!(config.port, Some(DEBUG_PORT));
        assert!(config.is_attached());
        assert_eq!(config.extra_args, vec!["--log-level", "debug"]);
        assert_eq!(config.request_timeout_ms, 5000);
    }

    #[test]
    fn test_missing_binary_path() {
        let err = resolve_executable(Path::new("/nonexistent/dir/kore-rpc")).unwrap_err();
        assert_eq!(err.kind(), "OracleUnavailable");
    }

    #[test]
    fn test_missing_binary_on_path() {
        let err = resolve_executable(Path::new("definitely-not-an-oracle-binary-7f3a")).unwrap_err();
        assert!(err.to_string().contains("not found on PATH"));
    }

    #[cfg(unix)]
    #[test]
    fn test_binary_found_on_path() {
        let found = resolve_executable(Path::new("sh")).unwrap();
        assert!(found.is_absolute());
    }

    #[test]
    fn test_partial_json() {
        let config: OracleConfig = serde_json::from_str(r#"{"port": 4000}"#).unwrap();
        assert_eq!(config.port, Some(4000));
        assert_eq!(config.server_binary, PathBuf::from("kore-rpc"));
    }
}

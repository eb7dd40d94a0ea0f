//! Oracle server lifecycle
//!
//! [`OracleSession`] owns one server process and the client connected to it.
//! The process is killed when the session is dropped, so no exit path of a
//! proof attempt leaves an orphaned server behind. Calling
//! [`SymbolicOracle::shutdown`] closes the connection and waits for the
//! process; dropping without it only sends the kill signal.

use crate::bug_report::BugReport;
use crate::client::RpcClient;
use crate::config::OracleConfig;
use crate::error::{OracleError, OracleResult};
use crate::oracle::{OracleLauncher, SemanticsHandle, StepResult, SymbolicOracle};
use async_trait::async_trait;
use induct_term::SymbolicState;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

/// A live oracle session
pub struct OracleSession {
    client: RpcClient,
    /// `None` when attached to a server this session did not start
    child: Option<Child>,
    port: u16,
    shut_down: bool,
}

impl OracleSession {
    /// Spawn a server for `semantics` (or attach to the configured port) and connect to it
    #[instrument(skip_all, fields(definition = %semantics.definition_dir.display()))]
    pub async fn start(config: &OracleConfig, semantics: &SemanticsHandle) -> OracleResult<Self> {
        let (child, port) = match config.port {
            Some(port) => {
                info!(port, "Attaching to running oracle server");
                (None, port)
            }
            None => {
                let port = free_port()?;
                let child = spawn_server(config, semantics, port)?;
                (Some(child), port)
            }
        };

        let addr = format!("{}:{}", config.host, port);
        let client = match RpcClient::connect(
            &addr,
            config.startup_timeout(),
            config.connect_retry(),
            config.request_timeout(),
        )
        .await
        {
            Ok(client) => client,
            Err(e) => {
                // The child is killed on drop; report why it is not answering
                return Err(match child {
                    Some(mut child) => match child.try_wait() {
                        Ok(Some(status)) => OracleError::unavailable(format!(
                            "oracle server exited during startup with {status}"
                        )),
                        _ => e,
                    },
                    None => e,
                });
            }
        };

        let client = match &config.bug_report {
            Some(dir) => {
                let report = BugReport::create(dir)?;
                info!(path = %report.path().display(), "Writing oracle bug report");
                client.with_bug_report(report)
            }
            None => client,
        };

        Ok(Self {
            client,
            child,
            port,
            shut_down: false,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether this session started (and therefore owns) the server process
    pub fn owns_server(&self) -> bool {
        self.child.is_some()
    }

    pub fn client(&self) -> &RpcClient {
        &self.client
    }
}

fn spawn_server(config: &OracleConfig, semantics: &SemanticsHandle, port: u16) -> OracleResult<Child> {
    let binary = config.resolve_binary()?;
    let mut cmd = Command::new(&binary);
    cmd.arg(&semantics.definition_dir)
        .arg("--module")
        .arg(&semantics.main_module)
        .arg("--server-port")
        .arg(port.to_string())
        .args(&config.extra_args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);

    debug!(binary = %binary.display(), port, "Spawning oracle server");
    cmd.spawn().map_err(|e| {
        OracleError::unavailable(format!("failed to spawn {}: {e}", binary.display()))
    })
}

/// Ask the OS for an unused local port
fn free_port() -> OracleResult<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

#[async_trait]
impl SymbolicOracle for OracleSession {
    async fn assume_defined(&mut self, state: &SymbolicState) -> OracleResult<SymbolicState> {
        self.client.assume_defined(state).await
    }

    async fn step(&mut self, state: &SymbolicState, max_depth: u32) -> OracleResult<StepResult> {
        self.client.step(state, max_depth).await
    }

    async fn implies(
        &mut self,
        antecedent: &SymbolicState,
        consequent: &SymbolicState,
    ) -> OracleResult<bool> {
        self.client.implies(antecedent, consequent).await
    }

    async fn shutdown(&mut self) -> OracleResult<()> {
        if self.shut_down {
            return Ok(());
        }
        self.shut_down = true;
        let closed = self.client.close().await;

        if let Some(child) = self.child.as_mut() {
            // Fails only if the process already exited
            let _ = child.start_kill();
            match timeout(std::time::Duration::from_secs(5), child.wait()).await {
                Ok(Ok(status)) => debug!(?status, "Oracle server stopped"),
                Ok(Err(e)) => warn!(port = self.port, error = %e, "Waiting for oracle server failed"),
                Err(_) => warn!(port = self.port, "Oracle server did not exit after kill"),
            }
        }
        info!(port = self.port, "Oracle session closed");
        closed
    }
}

impl Drop for OracleSession {
    fn drop(&mut self) {
        if self.shut_down {
            return;
        }
        if let Some(child) = self.child.as_mut() {
            warn!(port = self.port, "Oracle session dropped without shutdown, killing server");
            let _ = child.start_kill();
        }
    }
}

/// Starts a server process per session
#[derive(Debug, Clone, Default)]
pub struct ServerLauncher {
    config: OracleConfig,
}

impl ServerLauncher {
    pub fn new(config: OracleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }
}

#[async_trait]
impl OracleLauncher for ServerLauncher {
    type Session = OracleSession;

    async fn start(&self, semantics: &SemanticsHandle) -> OracleResult<OracleSession> {
        OracleSession::start(&self.config, semantics).await
    }
}

//! JSON-RPC client over line-delimited TCP

use crate::bug_report::{BugReport, Direction};
use crate::error::{OracleError, OracleResult};
use crate::oracle::{StepLabel, StepResult, Successor, SymbolicOracle};
use crate::rpc::{
    AssumeDefinedParams, AssumeDefinedResult, ExecuteParams, ExecuteResult, ImpliesParams,
    ImpliesResult, Request, Response, StopReason, ASSUME_DEFINED, EXECUTE, IMPLIES,
};
use async_trait::async_trait;
use induct_term::SymbolicState;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tracing::{debug, instrument, trace};

/// A connected oracle client.
///
/// Requests are issued one at a time; each waits for the response carrying
/// its id before the next is sent.
pub struct RpcClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    next_id: u64,
    request_timeout: Duration,
    bug_report: Option<BugReport>,
    closed: bool,
}

impl RpcClient {
    pub fn new(stream: TcpStream, request_timeout: Duration) -> Self {
        let (reader, writer) = stream.into_split();
        Self {
            reader: BufReader::new(reader),
            writer,
            next_id: 1,
            request_timeout,
            bug_report: None,
            closed: false,
        }
    }

    /// Connect, retrying every `retry` until `deadline` has passed
    pub async fn connect(
        addr: &str,
        deadline: Duration,
        retry: Duration,
        request_timeout: Duration,
    ) -> OracleResult<Self> {
        let start = Instant::now();
        loop {
            match TcpStream::connect(addr).await {
                Ok(stream) => {
                    debug!(addr, elapsed = ?start.elapsed(), "Connected to oracle");
                    return Ok(Self::new(stream, request_timeout));
                }
                Err(e) if start.elapsed() < deadline => {
                    trace!(addr, error = %e, "Oracle not accepting connections yet");
                    sleep(retry).await;
                }
                Err(e) => {
                    return Err(OracleError::unavailable(format!(
                        "cannot connect to {addr} within {deadline:?}: {e}"
                    )))
                }
            }
        }
    }

    #[must_use]
    pub fn with_bug_report(mut self, report: BugReport) -> Self {
        self.bug_report = Some(report);
        self
    }

    pub fn bug_report(&self) -> Option<&BugReport> {
        self.bug_report.as_ref()
    }

    /// Send one request and decode its result
    pub async fn call<P, R>(&mut self, method: &str, params: &P) -> OracleResult<R>
    where
        P: Serialize + Sync,
        R: DeserializeOwned,
    {
        if self.closed {
            return Err(OracleError::unavailable("session already shut down"));
        }
        let id = self.next_id;
        self.next_id += 1;
        let request = Request::new(id, method, serde_json::to_value(params)?);

        let response = match timeout(self.request_timeout, self.round_trip(&request)).await {
            Ok(response) => response?,
            Err(_) => return Err(OracleError::timeout(method, self.request_timeout)),
        };

        if let Some(err) = response.error {
            return Err(OracleError::Rpc {
                method: method.to_string(),
                code: err.code,
                message: err.message,
            });
        }
        let result = response
            .result
            .ok_or_else(|| OracleError::protocol(format!("{method} response has no result")))?;
        serde_json::from_value(result).map_err(|e| {
            OracleError::protocol(format!("cannot decode {method} result: {e}"))
        })
    }

    async fn round_trip(&mut self, request: &Request) -> OracleResult<Response> {
        let message = serde_json::to_value(request)?;
        if let Some(report) = self.bug_report.as_mut() {
            report.record(Direction::Request, &message);
        }

        let mut line = serde_json::to_string(&message)?;
        debug!(id = request.id, method = %request.method, "Sending request");
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;

        loop {
            let mut buf = String::new();
            let n = self.reader.read_line(&mut buf).await?;
            if n == 0 {
                return Err(OracleError::unavailable("oracle closed the connection"));
            }
            let buf = buf.trim();
            if buf.is_empty() {
                continue;
            }
            let value: serde_json::Value = serde_json::from_str(buf)
                .map_err(|e| OracleError::protocol(format!("malformed response: {e}")))?;
            if let Some(report) = self.bug_report.as_mut() {
                report.record(Direction::Response, &value);
            }
            let response: Response = serde_json::from_value(value)
                .map_err(|e| OracleError::protocol(format!("not a JSON-RPC response: {e}")))?;
            match response.id {
                Some(id) if id == request.id => return Ok(response),
                // Error responses to unparseable requests carry a null id
                None if response.error.is_some() => return Ok(response),
                other => {
                    return Err(OracleError::protocol(format!(
                        "response id {other:?} does not match request id {}",
                        request.id
                    )))
                }
            }
        }
    }

    /// Close the connection; later calls fail with `OracleUnavailable`
    pub async fn close(&mut self) -> OracleResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if let Some(report) = self.bug_report.as_mut() {
            report.flush()?;
        }
        self.writer.shutdown().await?;
        Ok(())
    }
}

/// Map an `execute` reply onto the three outcomes the search distinguishes
pub fn interpret_execute(result: ExecuteResult) -> StepResult {
    match result.reason {
        StopReason::Vacuous => StepResult::Vacuous,
        StopReason::Stuck if result.depth == 0 => StepResult::Stuck,
        StopReason::Terminal if result.depth == 0 => StepResult::Stuck,
        StopReason::Stuck | StopReason::Terminal | StopReason::DepthBound => {
            let label = result
                .rule
                .map(StepLabel::new)
                .unwrap_or_else(|| StepLabel::unlabelled(result.depth));
            StepResult::Successors(vec![Successor {
                state: result.state,
                label,
                depth: result.depth,
            }])
        }
        StopReason::Branching | StopReason::CutPointRule => {
            if result.next_states.is_empty() {
                return StepResult::Stuck;
            }
            let depth = result.depth + 1;
            StepResult::Successors(
                result
                    .next_states
                    .into_iter()
                    .map(|next| Successor {
                        state: next.state,
                        label: next
                            .rule_id
                            .map(StepLabel::new)
                            .unwrap_or_else(|| StepLabel::unlabelled(depth)),
                        depth,
                    })
                    .collect(),
            )
        }
    }
}

#[async_trait]
impl SymbolicOracle for RpcClient {
    #[instrument(skip_all)]
    async fn assume_defined(&mut self, state: &SymbolicState) -> OracleResult<SymbolicState> {
        let params = AssumeDefinedParams {
            state: state.clone(),
        };
        let result: AssumeDefinedResult = self.call(ASSUME_DEFINED, &params).await?;
        Ok(result.state)
    }

    #[instrument(skip(self, state))]
    async fn step(&mut self, state: &SymbolicState, max_depth: u32) -> OracleResult<StepResult> {
        let params = ExecuteParams {
            state: state.clone(),
            max_depth,
        };
        let result: ExecuteResult = self.call(EXECUTE, &params).await?;
        debug!(reason = ?result.reason, depth = result.depth, "Execute finished");
        Ok(interpret_execute(result))
    }

    async fn implies(
        &mut self,
        antecedent: &SymbolicState,
        consequent: &SymbolicState,
    ) -> OracleResult<bool> {
        let params = ImpliesParams {
            antecedent: antecedent.clone(),
            consequent: consequent.clone(),
        };
        let result: ImpliesResult = self.call(IMPLIES, &params).await?;
        Ok(result.valid)
    }

    async fn shutdown(&mut self) -> OracleResult<()> {
        self.close().await
    }
}

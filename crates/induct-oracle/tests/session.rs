//! Sessions against an in-process mock server

use induct_oracle::bug_report::{read_entries, Direction};
use induct_oracle::rpc::{Response, RpcError};
use induct_oracle::{
    OracleConfigBuilder, OracleError, OracleSession, SemanticsHandle, StepResult, SymbolicOracle,
};
use induct_term::{SymbolicState, Term};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

fn semantics() -> SemanticsHandle {
    SemanticsHandle {
        definition_dir: "/tmp/induction-kompile".into(),
        main_module: "INDUCTION-RULES".to_string(),
        syntax_module: "INDUCTION-RULES-SYNTAX".to_string(),
    }
}

fn state(name: &str) -> SymbolicState {
    SymbolicState::new(Term::var(name))
}

/// Answer requests on the first accepted connection with `handler`
async fn mock_server<F>(handler: F) -> u16
where
    F: Fn(&str, &Value) -> Result<Value, RpcError> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let request: Value = serde_json::from_str(&line).unwrap();
            let id = request["id"].as_u64().unwrap();
            let method = request["method"].as_str().unwrap().to_string();
            let response = match handler(&method, &request["params"]) {
                Ok(result) => Response::success(id, result),
                Err(err) => Response::failure(Some(id), err),
            };
            let mut out = serde_json::to_string(&response).unwrap();
            out.push('\n');
            if writer.write_all(out.as_bytes()).await.is_err() {
                break;
            }
        }
    });
    port
}

fn attached(port: u16) -> induct_oracle::OracleConfig {
    OracleConfigBuilder::new()
        .port(port)
        .startup_timeout(Duration::from_secs(2))
        .request_timeout(Duration::from_secs(2))
        .build()
}

#[tokio::test]
async fn attached_session_round_trips_every_method() {
    let port = mock_server(|method, params| match method {
        "assume-defined" => {
            let mut state = params["state"].clone();
            state["constraints"] = json!([{"node": "variable", "name": "Defined"}]);
            Ok(json!({ "state": state }))
        }
        "execute" => Ok(json!({
            "reason": "branching",
            "depth": 2,
            "state": params["state"],
            "next-states": [
                {"state": {"config": {"node": "variable", "name": "L"}}, "rule-id": "IMP.if-true"},
                {"state": {"config": {"node": "variable", "name": "R"}}, "rule-id": "IMP.if-false"}
            ]
        })),
        "implies" => Ok(json!({
            "valid": params["antecedent"]["config"] == params["consequent"]["config"]
        })),
        _ => Err(RpcError::new(RpcError::METHOD_NOT_FOUND, "unknown method")),
    })
    .await;

    let mut session = OracleSession::start(&attached(port), &semantics())
        .await
        .unwrap();
    assert!(!session.owns_server());
    assert_eq!(session.port(), port);

    let defined = session.assume_defined(&state("X")).await.unwrap();
    assert_eq!(defined.constraints, vec![Term::var("Defined")]);

    let StepResult::Successors(succ) = session.step(&state("X"), 100).await.unwrap() else {
        panic!("expected a branch");
    };
    assert_eq!(succ.len(), 2);
    assert_eq!(succ[0].label.0, "IMP.if-true");
    assert_eq!(succ[1].state, state("R"));
    assert_eq!(succ[0].depth, 3);

    assert!(session.implies(&state("A"), &state("A")).await.unwrap());
    assert!(!session.implies(&state("A"), &state("B")).await.unwrap());

    session.shutdown().await.unwrap();
    let err = session.step(&state("X"), 1).await.unwrap_err();
    assert_eq!(err.kind(), "OracleUnavailable");
}

#[tokio::test]
async fn rpc_error_is_a_protocol_error() {
    let port = mock_server(|_, _| Err(RpcError::new(RpcError::INVALID_PARAMS, "bad state"))).await;
    let mut session = OracleSession::start(&attached(port), &semantics())
        .await
        .unwrap();

    let err = session.step(&state("X"), 1).await.unwrap_err();
    assert!(matches!(err, OracleError::Rpc { code: -32602, .. }));
    assert_eq!(err.kind(), "OracleProtocolError");
}

#[tokio::test]
async fn undecodable_result_is_a_protocol_error() {
    let port = mock_server(|_, _| Ok(json!({"unexpected": true}))).await;
    let mut session = OracleSession::start(&attached(port), &semantics())
        .await
        .unwrap();

    let err = session.implies(&state("A"), &state("B")).await.unwrap_err();
    assert!(matches!(err, OracleError::Protocol(_)));
}

#[tokio::test]
async fn bug_report_logs_requests_and_responses() {
    let port = mock_server(|_, _| Ok(json!({"valid": true}))).await;
    let dir = tempfile::tempdir().unwrap();
    let config = OracleConfigBuilder::new()
        .port(port)
        .bug_report(dir.path())
        .build();

    let mut session = OracleSession::start(&config, &semantics()).await.unwrap();
    session.implies(&state("A"), &state("A")).await.unwrap();
    let path = session.client().bug_report().unwrap().path().to_path_buf();
    session.shutdown().await.unwrap();
    drop(session);

    let entries = read_entries(&path).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].direction, Direction::Request);
    assert_eq!(entries[0].message["method"], "implies");
    assert_eq!(entries[1].message["result"]["valid"], true);
}

#[tokio::test]
async fn nothing_listening_is_unavailable() {
    // Bind then drop to get a port that is very likely closed
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = OracleConfigBuilder::new()
        .port(port)
        .startup_timeout(Duration::from_millis(200))
        .build();
    let err = OracleSession::start(&config, &semantics())
        .await
        .err()
        .unwrap();
    assert_eq!(err.kind(), "OracleUnavailable");
}

#[tokio::test]
async fn missing_server_binary_is_unavailable() {
    let config = OracleConfigBuilder::new()
        .server_binary("/nonexistent/bin/kore-rpc")
        .build();
    let err = OracleSession::start(&config, &semantics())
        .await
        .err()
        .unwrap();
    assert!(matches!(err, OracleError::Unavailable(_)));
}

#[cfg(unix)]
#[tokio::test]
async fn server_exiting_during_startup_is_reported() {
    // The server command line starts with the definition path, so `sh` runs it as a script
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("definition");
    std::fs::write(&script, "exit 3\n").unwrap();
    let semantics = SemanticsHandle {
        definition_dir: script,
        ..semantics()
    };

    let config = OracleConfigBuilder::new()
        .server_binary("sh")
        .startup_timeout(Duration::from_millis(500))
        .build();
    let err = OracleSession::start(&config, &semantics)
        .await
        .err()
        .unwrap();
    assert!(err.to_string().contains("exited during startup"), "{err}");
}

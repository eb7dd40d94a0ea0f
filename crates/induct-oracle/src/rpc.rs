//! JSON-RPC 2.0 message types and the oracle method payloads
//!
//! Messages are single JSON objects, one per line.
//!
//! | Method           | Params                           | Result                       |
//! |------------------|----------------------------------|------------------------------|
//! | `assume-defined` | `{state}`                        | `{state}`                    |
//! | `execute`        | `{state, max-depth}`             | `{reason, depth, state, next-states, rule}` |
//! | `implies`        | `{antecedent, consequent}`       | `{valid}`                    |

use induct_term::SymbolicState;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

pub const ASSUME_DEFINED: &str = "assume-defined";
pub const EXECUTE: &str = "execute";
pub const IMPLIES: &str = "implies";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl Request {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl Response {
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(id),
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Option<u64>, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub const PARSE_ERROR: i64 = -32700;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssumeDefinedParams {
    pub state: SymbolicState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssumeDefinedResult {
    pub state: SymbolicState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExecuteParams {
    pub state: SymbolicState,
    pub max_depth: u32,
}

/// Why the server stopped executing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    /// More than one rule applies; `next-states` lists the branches
    Branching,
    /// `max-depth` steps were taken; `state` is the resulting state
    DepthBound,
    /// No rule applies to `state`
    Stuck,
    /// `state` is a final configuration
    Terminal,
    /// The path condition is unsatisfiable
    Vacuous,
    /// A cut-point rule was reached; `next-states` holds its result
    CutPointRule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NextState {
    pub state: SymbolicState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExecuteResult {
    pub reason: StopReason,
    pub depth: u32,
    pub state: SymbolicState,
    #[serde(default)]
    pub next_states: Vec<NextState>,
    /// Rule that ended the execution, when there is one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpliesParams {
    pub antecedent: SymbolicState,
    pub consequent: SymbolicState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpliesResult {
    pub valid: bool,
}

//! Request/response operations for embedding the engine behind a transport
//!
//! Every failure is a client fault; a transport only needs to map `Err` to
//! its client-error response carrying an [`ErrorBody`], and `Ok` to the
//! payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::engine::RuleEngine;
use crate::error::{Result, RuleError};
use crate::rule::Record;

/// Create: `{"rule_string": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRequest {
    pub rule_string: String,
}

/// Evaluate: `{"rule": {...}, "data": {...}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluateRequest {
    /// Serialized AST as returned by Create; `{}` or `null` means no rule
    #[serde(default)]
    pub rule: Value,
    pub data: Record,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub result: bool,
}

/// Structured failure payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub detail: String,
}

impl From<&RuleError> for ErrorBody {
    fn from(err: &RuleError) -> Self {
        Self {
            error: err.kind().as_str(),
            detail: err.to_string(),
        }
    }
}

/// Parse a rule string and return its serialized AST
pub fn create(engine: &RuleEngine, request: &CreateRequest) -> Result<Value> {
    match engine.create(&request.rule_string) {
        Ok(mapping) => {
            debug!(rule = %request.rule_string, "rule created");
            Ok(mapping)
        }
        Err(err) => {
            debug!(rule = %request.rule_string, error = %err, "rule rejected");
            Err(err)
        }
    }
}

/// Evaluate a serialized AST against the request's record
pub fn evaluate(engine: &RuleEngine, request: &EvaluateRequest) -> Result<EvaluateResponse> {
    match engine.evaluate_mapping(&request.rule, &request.data) {
        Ok(result) => {
            debug!(result, fields = request.data.len(), "rule evaluated");
            Ok(EvaluateResponse { result })
        }
        Err(err) => {
            debug!(kind = err.kind().as_str(), error = %err, "rule evaluation failed");
            Err(err)
        }
    }
}

/// Create, taking and returning JSON text
pub fn create_json(engine: &RuleEngine, body: &str) -> Result<String> {
    let request: CreateRequest = serde_json::from_str(body)?;
    Ok(create(engine, &request)?.to_string())
}

/// Evaluate, taking and returning JSON text
pub fn evaluate_json(engine: &RuleEngine, body: &str) -> Result<String> {
    let request: EvaluateRequest = serde_json::from_str(body)?;
    let response = evaluate(engine, &request)?;
    Ok(serde_json::to_string(&response)?)
}

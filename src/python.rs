//! Python bindings via PyO3

use once_cell::sync::Lazy;
use pyo3::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::RuleEngine;
use crate::error::RuleError;
use crate::rule::{self, AstNode, FieldValue, Record};

/// Shared engine behind the module-level functions
static ENGINE: Lazy<Arc<RuleEngine>> = Lazy::new(|| Arc::new(RuleEngine::default()));

// ============================================================================
// Helper Functions
// ============================================================================

/// Record value as received from Python; bools arrive as integers
#[derive(FromPyObject)]
enum PyFieldValue {
    Integer(i64),
    Number(f64),
    Text(String),
}

fn to_record(data: HashMap<String, PyFieldValue>) -> Record {
    data.into_iter()
        .map(|(name, value)| {
            let value = match value {
                PyFieldValue::Integer(n) => FieldValue::Integer(n),
                PyFieldValue::Number(n) => FieldValue::Number(n),
                PyFieldValue::Text(s) => FieldValue::Text(s),
            };
            (name, value)
        })
        .collect()
}

fn parse_rule_json(rule_json: &str) -> Result<Option<AstNode>, RuleError> {
    let mapping: serde_json::Value = serde_json::from_str(rule_json)?;
    ENGINE.deserialize(&mapping)
}

// ============================================================================
// Python Functions
// ============================================================================

/// Parse a rule string and return its serialized AST as JSON
///
/// # Raises
/// ValueError if the rule does not match the grammar
#[pyfunction]
fn create_rule(rule_string: &str) -> PyResult<String> {
    let mapping = ENGINE.create(rule_string)?;
    Ok(mapping.to_string())
}

/// Evaluate a serialized AST (JSON) against a dict of numbers and strings
///
/// # Raises
/// ValueError on malformed rules, missing fields or unsupported operators
#[pyfunction]
fn evaluate_rule(rule_json: &str, data: HashMap<String, PyFieldValue>) -> PyResult<bool> {
    let ast = parse_rule_json(rule_json)?;
    let record = to_record(data);
    let result = match ast {
        Some(ast) => ENGINE.evaluate(&ast, &record)?,
        None => true,
    };
    Ok(result)
}

/// Evaluate one serialized AST against many records without blocking asyncio
///
/// The evaluation runs on Tokio's blocking pool; the GIL is not held while
/// records are checked.
///
/// # Example (Python)
/// ```python
/// results = await evaluate_many_async(rule_json, [{"age": 35}, {"age": 20}])
/// ```
#[pyfunction]
fn evaluate_many_async<'py>(
    py: Python<'py>,
    rule_json: String,
    records: Vec<HashMap<String, PyFieldValue>>,
) -> PyResult<Bound<'py, PyAny>> {
    // Fail fast on malformed rules before entering async context
    let ast = parse_rule_json(&rule_json)?;
    let records: Vec<Record> = records.into_iter().map(to_record).collect();
    let engine = Arc::clone(&ENGINE);

    pyo3_async_runtimes::tokio::future_into_py(py, async move {
        let results = tokio::task::spawn_blocking(move || {
            records
                .iter()
                .map(|record| match &ast {
                    Some(ast) => engine.evaluate(ast, record),
                    None => Ok(true),
                })
                .collect::<Result<Vec<bool>, RuleError>>()
        })
        .await
        .map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!(
                "Evaluation task panicked: {}",
                e
            ))
        })??;

        Ok(results)
    })
}

// ============================================================================
// Rule PyClass
// ============================================================================

/// Parsed rule held in Rust memory
#[pyclass(name = "Rule")]
pub struct PyRule {
    ast: Option<AstNode>,
}

#[pymethods]
impl PyRule {
    #[new]
    fn new(rule_string: &str) -> PyResult<Self> {
        Ok(Self {
            ast: Some(ENGINE.parse(rule_string)?),
        })
    }

    /// Rebuild a rule from the JSON returned by `create_rule` or `to_json`
    #[staticmethod]
    fn from_json(rule_json: &str) -> PyResult<Self> {
        Ok(Self {
            ast: parse_rule_json(rule_json)?,
        })
    }

    fn to_json(&self) -> String {
        match &self.ast {
            Some(ast) => rule::to_json_string(ast),
            None => "{}".to_string(),
        }
    }

    fn evaluate(&self, data: HashMap<String, PyFieldValue>) -> PyResult<bool> {
        let record = to_record(data);
        match &self.ast {
            Some(ast) => Ok(ENGINE.evaluate(ast, &record)?),
            None => Ok(true),
        }
    }

    fn __repr__(&self) -> String {
        match &self.ast {
            Some(ast) => format!("Rule({:?})", ast.to_string()),
            None => "Rule(<empty>)".to_string(),
        }
    }
}

// ============================================================================
// Python Module Definition
// ============================================================================

/// Python module definition
#[pymodule]
fn rule_ast_engine(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(create_rule, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate_rule, m)?)?;
    m.add_function(wrap_pyfunction!(evaluate_many_async, m)?)?;
    m.add_class::<PyRule>()?;
    Ok(())
}

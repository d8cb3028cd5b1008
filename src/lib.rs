//! Rule AST Engine - boolean rule compiler and evaluator
//!
//! Rule strings such as `age > 30 AND department = 'Sales'` are parsed into
//! an [`AstNode`] tree, which can be serialized to a nested mapping, sent
//! elsewhere, deserialized and evaluated against a [`Record`].
//!
//! ```
//! use rule_ast_engine::{parse, evaluate, Record};
//!
//! let ast = parse("(age > 30 OR age < 10) AND department = 'Sales'").unwrap();
//! let record = Record::new().with("age", 35).with("department", "Sales");
//! assert!(evaluate(&ast, &record).unwrap());
//! ```
//!
//! With the `python` feature the crate also builds a Python extension module.

pub mod config;
pub mod engine;
pub mod error;
pub mod rule;
pub mod service;

#[cfg(feature = "python")]
mod python;

pub use config::EngineConfig;
pub use engine::RuleEngine;
pub use error::{ErrorKind, Result, RuleError};
pub use rule::{
    deserialize, evaluate, parse, serialize, tokenize, AstNode, Condition, Connective,
    FieldValue, Operator, Record, RuleCache, Token,
};

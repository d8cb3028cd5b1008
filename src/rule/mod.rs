//! Rule parsing and evaluation module
//!
//! This module handles parsing rule strings like
//! `age > 30 AND department = 'Sales'`, converting the resulting tree to and
//! from its nested-mapping form, and evaluating it against a [`Record`].

mod ast;
pub mod cache;
pub mod codec;
mod evaluator;
pub mod parser;
mod record;


pub use ast::*;
pub use cache::*;
pub use codec::{deserialize, deserialize_with_max_depth, from_json_str, serialize, to_json_string};
pub use evaluator::*;
pub use parser::{parse, parse_with_max_depth, tokenize, Token, Tokens};
pub use record::*;

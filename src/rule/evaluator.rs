//! Rule evaluator

use std::cmp::Ordering;

use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::{Result, RuleError};
use crate::rule::ast::{AstNode, Condition, Connective, Operator};
use crate::rule::record::{FieldValue, Record};

/// Evaluate an AST against a record
pub fn evaluate(ast: &AstNode, record: &Record) -> Result<bool> {
    evaluate_with_max_depth(ast, record, DEFAULT_MAX_DEPTH)
}

/// Evaluate a possibly absent rule; no rule is vacuously true
pub fn evaluate_optional(ast: Option<&AstNode>, record: &Record) -> Result<bool> {
    match ast {
        Some(ast) => evaluate(ast, record),
        None => Ok(true),
    }
}

pub fn evaluate_with_max_depth(ast: &AstNode, record: &Record, max_depth: usize) -> Result<bool> {
    check(ast, record, 1, max_depth)
}

fn check(node: &AstNode, record: &Record, depth: usize, max_depth: usize) -> Result<bool> {
    if depth > max_depth {
        return Err(RuleError::DepthExceeded(max_depth));
    }

    match node {
        AstNode::Operand(cond) => check_condition(cond, record),
        AstNode::Combinator {
            operator,
            left,
            right,
        } => {
            // No short-circuit: an error on either side fails the whole rule
            let left = check(left, record, depth + 1, max_depth)?;
            let right = check(right, record, depth + 1, max_depth)?;
            Ok(Connective::from_keyword(operator)?.apply(left, right))
        }
    }
}

/// Evaluate a single comparison against a record
pub fn check_condition(cond: &Condition, record: &Record) -> Result<bool> {
    let field_value = record
        .get(&cond.field)
        .ok_or_else(|| RuleError::FieldNotFound(cond.field.clone()))?;
    let operator = Operator::from_symbol(&cond.operator)?;

    match field_value {
        // Numeric fields compare numerically when the literal parses as a number
        FieldValue::Integer(n) => match cond.value.trim().parse::<f64>() {
            Ok(literal) => Ok(integer_ordering(*n, literal)
                .map_or(operator == Operator::NotEqual, |ord| matches_ordering(ord, operator))),
            Err(_) => compare_mismatched(operator, field_value),
        },
        FieldValue::Number(n) => match cond.value.trim().parse::<f64>() {
            Ok(literal) => Ok(compare(n, &literal, operator)),
            Err(_) => compare_mismatched(operator, field_value),
        },
        FieldValue::Text(s) => Ok(compare(s.as_str(), cond.value.as_str(), operator)),
    }
}

#[inline]
fn compare<T: PartialOrd + ?Sized>(lhs: &T, rhs: &T, operator: Operator) -> bool {
    match operator {
        Operator::Greater => lhs > rhs,
        Operator::Less => lhs < rhs,
        Operator::GreaterEqual => lhs >= rhs,
        Operator::LessEqual => lhs <= rhs,
        Operator::Equal => lhs == rhs,
        Operator::NotEqual => lhs != rhs,
    }
}

/// Exact ordering of an integer against a float; `None` when the float is NaN
fn integer_ordering(n: i64, literal: f64) -> Option<Ordering> {
    // 2^63; every float below it in magnitude truncates into i64 range
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;

    if literal.is_nan() {
        return None;
    }
    if literal >= LIMIT {
        return Some(Ordering::Less);
    }
    if literal < -LIMIT {
        return Some(Ordering::Greater);
    }

    let whole = literal.trunc();
    match n.cmp(&(whole as i64)) {
        Ordering::Equal => whole.partial_cmp(&literal),
        ord => Some(ord),
    }
}

#[inline]
fn matches_ordering(ord: Ordering, operator: Operator) -> bool {
    match operator {
        Operator::Greater => ord == Ordering::Greater,
        Operator::Less => ord == Ordering::Less,
        Operator::GreaterEqual => ord != Ordering::Less,
        Operator::LessEqual => ord != Ordering::Greater,
        Operator::Equal => ord == Ordering::Equal,
        Operator::NotEqual => ord != Ordering::Equal,
    }
}

/// A number never equals a non-numeric literal, and cannot be ordered against one
fn compare_mismatched(operator: Operator, field_value: &FieldValue) -> Result<bool> {
    match operator {
        Operator::Equal => Ok(false),
        Operator::NotEqual => Ok(true),
        _ => Err(RuleError::TypeMismatch {
            operator: operator.symbol().to_string(),
            field_type: field_value.type_name(),
            literal_type: "string",
        }),
    }
}

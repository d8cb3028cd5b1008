//! Rule string tokenizer and recursive-descent parser
//!
//! Grammar:
//!
//! ```text
//! Expression := Term ( ('AND' | 'OR') Expression )?
//! Term       := '(' Expression ')' | Condition
//! Condition  := FIELD OPERATOR VALUE
//! ```
//!
//! `AND` and `OR` share one precedence level and chain to the right, so
//! `a AND b OR c` is `a AND (b OR c)`. Parentheses are the only way to group
//! to the left.

use smallvec::SmallVec;
use std::fmt;

use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::{Result, RuleError};
use crate::rule::ast::{AstNode, Condition, Operator};

/// Lexical unit of a rule string
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    OpenParen,
    CloseParen,
    And,
    Or,
    Comparison(Operator),
    /// Field name or value with one pair of surrounding quotes removed
    Literal(String),
}

/// Token buffer; typical rules fit without spilling to the heap
pub type Tokens = SmallVec<[Token; 16]>;

impl Token {
    pub(crate) fn classify(raw: &str) -> Token {
        match raw {
            "(" => Token::OpenParen,
            ")" => Token::CloseParen,
            "AND" => Token::And,
            "OR" => Token::Or,
            _ => match Operator::from_symbol(raw) {
                Ok(op) => Token::Comparison(op),
                Err(_) => Token::Literal(strip_quotes(raw).to_string()),
            },
        }
    }

    /// Text usable as a condition field, operator or value
    fn as_text(&self) -> Option<&str> {
        match self {
            Token::Comparison(op) => Some(op.symbol()),
            Token::Literal(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::OpenParen => f.write_str("("),
            Token::CloseParen => f.write_str(")"),
            Token::And => f.write_str("AND"),
            Token::Or => f.write_str("OR"),
            Token::Comparison(op) => f.write_str(op.symbol()),
            Token::Literal(text) => f.write_str(text),
        }
    }
}

fn strip_quotes(raw: &str) -> &str {
    let s = raw.strip_prefix('\'').unwrap_or(raw);
    s.strip_suffix('\'').unwrap_or(s)
}

/// Split a rule string into tokens.
///
/// Parentheses always stand alone; everything else is split on whitespace.
/// Quoted values cannot contain spaces.
pub fn tokenize(rule: &str) -> Tokens {
    rule.replace('(', " ( ")
        .replace(')', " ) ")
        .split_whitespace()
        .map(Token::classify)
        .collect()
}

/// Parse a rule string into an AST
pub fn parse(rule: &str) -> Result<AstNode> {
    parse_with_max_depth(rule, DEFAULT_MAX_DEPTH)
}

/// Parse a rule string, rejecting nesting deeper than `max_depth`
pub fn parse_with_max_depth(rule: &str, max_depth: usize) -> Result<AstNode> {
    let tokens = tokenize(rule);
    parse_tokens(&tokens, max_depth)
}

/// Parse an already tokenized rule; every token must be consumed
pub fn parse_tokens(tokens: &[Token], max_depth: usize) -> Result<AstNode> {
    if tokens.is_empty() {
        return Err(RuleError::syntax("Empty rule string"));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        max_depth,
    };
    let node = parser.parse_expression(1)?;

    match parser.peek() {
        None => Ok(node),
        Some(Token::CloseParen) => Err(RuleError::syntax("Unmatched closing parenthesis")),
        Some(token) => Err(RuleError::syntax(format!(
            "Unexpected token '{}' after end of expression",
            token
        ))),
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn parse_expression(&mut self, depth: usize) -> Result<AstNode> {
        if depth > self.max_depth {
            return Err(RuleError::syntax(format!(
                "Rule nesting exceeds maximum depth of {}",
                self.max_depth
            )));
        }

        let term = self.parse_term(depth)?;

        let keyword = match self.peek() {
            Some(Token::And) => "AND",
            Some(Token::Or) => "OR",
            _ => return Ok(term),
        };
        self.pos += 1;

        if self.peek().is_none() {
            return Err(RuleError::syntax(format!(
                "Unexpected end of expression after '{}'",
                keyword
            )));
        }

        let right = self.parse_expression(depth + 1)?;
        Ok(AstNode::combinator(keyword, term, right))
    }

    fn parse_term(&mut self, depth: usize) -> Result<AstNode> {
        match self.peek() {
            None => Err(RuleError::syntax("Unexpected end of expression")),
            Some(Token::OpenParen) => {
                self.pos += 1;
                let node = self.parse_expression(depth + 1)?;
                match self.peek() {
                    Some(Token::CloseParen) => {
                        self.pos += 1;
                        Ok(node)
                    }
                    _ => Err(RuleError::syntax("Missing closing parenthesis")),
                }
            }
            Some(_) => self.parse_condition(),
        }
    }

    fn parse_condition(&mut self) -> Result<AstNode> {
        let tokens = self.tokens;
        let remaining = &tokens[self.pos..];
        if remaining.len() < 3 {
            return Err(RuleError::syntax(format!(
                "Invalid condition format: expected FIELD OPERATOR VALUE, found '{}'",
                join(remaining)
            )));
        }

        let field = slot(&remaining[0], "field")?;
        let operator = slot(&remaining[1], "operator")?;
        let value = slot(&remaining[2], "value")?;
        self.pos += 3;

        Ok(AstNode::Operand(Condition::new(field, operator, value)))
    }
}

fn slot<'t>(token: &'t Token, role: &str) -> Result<&'t str> {
    token.as_text().ok_or_else(|| {
        RuleError::syntax(format!("Expected condition {} but found '{}'", role, token))
    })
}

fn join(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

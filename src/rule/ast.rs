//! Abstract Syntax Tree for rule expressions

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, RuleError};
use crate::rule::parser::Token;

/// AST node for rule expressions
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    /// Single comparison like `age > 30`
    Operand(Condition),
    /// Two sub-expressions joined by `AND` / `OR`
    Combinator {
        operator: String,
        left: Box<AstNode>,
        right: Box<AstNode>,
    },
}

/// Leaf comparison, kept exactly as written in the rule.
///
/// The operator is not checked when the node is built; an unknown operator
/// is reported when the node is evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: String,
    pub value: String,
}

impl Condition {
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

impl AstNode {
    pub fn operand(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        AstNode::Operand(Condition::new(field, operator, value))
    }

    pub fn combinator(operator: impl Into<String>, left: AstNode, right: AstNode) -> Self {
        AstNode::Combinator {
            operator: operator.into(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: AstNode, right: AstNode) -> Self {
        Self::combinator(Connective::And.keyword(), left, right)
    }

    pub fn or(left: AstNode, right: AstNode) -> Self {
        Self::combinator(Connective::Or.keyword(), left, right)
    }

    pub fn is_operand(&self) -> bool {
        matches!(self, AstNode::Operand(_))
    }

    /// Number of nodes on the longest root-to-leaf path; a lone operand has depth 1
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, level)) = stack.pop() {
            max = max.max(level);
            if let AstNode::Combinator { left, right, .. } = node {
                stack.push((&**left, level + 1));
                stack.push((&**right, level + 1));
            }
        }
        max
    }

    /// Total number of operand leaves
    pub fn operand_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                AstNode::Operand(_) => count += 1,
                AstNode::Combinator { left, right, .. } => {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }
        count
    }
}

/// Renders the node back into rule syntax.
///
/// Chains nest to the right, so only combinators in the left position need
/// parentheses. Words that would not tokenize back as themselves (empty text,
/// keywords, comparison symbols, surrounding quotes) are written quoted.
/// Text containing whitespace or parentheses cannot be expressed in rule
/// syntax and does not survive a parse of the output.
impl fmt::Display for AstNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AstNode::Operand(cond) => {
                write_word(f, &cond.field)?;
                f.write_str(" ")?;
                if Operator::from_symbol(&cond.operator).is_ok() {
                    f.write_str(&cond.operator)?;
                } else {
                    write_word(f, &cond.operator)?;
                }
                f.write_str(" ")?;
                write_word(f, &cond.value)
            }
            AstNode::Combinator {
                operator,
                left,
                right,
            } => {
                if left.is_operand() {
                    write!(f, "{} {} {}", left, operator, right)
                } else {
                    write!(f, "({}) {} {}", left, operator, right)
                }
            }
        }
    }
}

fn write_word(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    match Token::classify(text) {
        Token::Literal(literal) if !text.is_empty() && literal == text => f.write_str(text),
        _ => write!(f, "'{}'", text),
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Greater than (>)
    Greater,
    /// Less than (<)
    Less,
    /// Greater than or equal (>=)
    GreaterEqual,
    /// Less than or equal (<=)
    LessEqual,
    /// Equal (=)
    Equal,
    /// Not equal (!=)
    NotEqual,
}

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::Greater,
        Operator::Less,
        Operator::GreaterEqual,
        Operator::LessEqual,
        Operator::Equal,
        Operator::NotEqual,
    ];

    pub fn from_symbol(symbol: &str) -> Result<Self> {
        match symbol {
            ">" => Ok(Operator::Greater),
            "<" => Ok(Operator::Less),
            ">=" => Ok(Operator::GreaterEqual),
            "<=" => Ok(Operator::LessEqual),
            "=" => Ok(Operator::Equal),
            "!=" => Ok(Operator::NotEqual),
            other => Err(RuleError::UnsupportedOperator(other.to_string())),
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Greater => ">",
            Operator::Less => "<",
            Operator::GreaterEqual => ">=",
            Operator::LessEqual => "<=",
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Logical operators joining two sub-expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    /// Keywords are case sensitive: `and` is an ordinary token.
    pub fn from_keyword(keyword: &str) -> Result<Self> {
        match keyword {
            "AND" => Ok(Connective::And),
            "OR" => Ok(Connective::Or),
            other => Err(RuleError::UnsupportedOperator(other.to_string())),
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }

    pub fn apply(&self, left: bool, right: bool) -> bool {
        match self {
            Connective::And => left && right,
            Connective::Or => left || right,
        }
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_symbols() {
        for op in Operator::ALL {
            assert_eq!(Operator::from_symbol(op.symbol()).unwrap(), op);
        }
        assert!(matches!(
            Operator::from_symbol("=="),
            Err(RuleError::UnsupportedOperator(op)) if op == "=="
        ));
    }

    #[test]
    fn test_connective_is_case_sensitive() {
        assert_eq!(Connective::from_keyword("AND").unwrap(), Connective::And);
        assert_eq!(Connective::from_keyword("OR").unwrap(), Connective::Or);
        assert!(Connective::from_keyword("and").is_err());
        assert!(Connective::from_keyword("XOR").is_err());
    }

    #[test]
    fn test_depth_and_count() {
        let leaf = AstNode::operand("age", ">", "30");
        assert_eq!(leaf.depth(), 1);
        assert_eq!(leaf.operand_count(), 1);

        let tree = AstNode::and(
            AstNode::or(leaf.clone(), leaf.clone()),
            AstNode::and(leaf.clone(), AstNode::and(leaf.clone(), leaf)),
        );
        assert_eq!(tree.depth(), 4);
        assert_eq!(tree.operand_count(), 5);
    }

    #[test]
    fn test_display_parenthesizes_left_combinators() {
        let tree = AstNode::and(
            AstNode::or(
                AstNode::operand("age", ">", "30"),
                AstNode::operand("age", "<", "10"),
            ),
            AstNode::operand("department", "=", "Sales"),
        );
        assert_eq!(
            tree.to_string(),
            "(age > 30 OR age < 10) AND department = Sales"
        );
    }

    #[test]
    fn test_display_quotes_words_that_would_not_reparse() {
        let cases = [
            (AstNode::operand("x", "=", ""), "x = ''"),
            (AstNode::operand("mode", "=", "AND"), "mode = 'AND'"),
            (AstNode::operand("sign", "=", ">="), "sign = '>='"),
            (AstNode::operand("OR", "!=", "1"), "'OR' != 1"),
            (AstNode::operand("name", "=", "'quoted'"), "name = ''quoted''"),
            (AstNode::operand("age", "AND", "30"), "age 'AND' 30"),
        ];

        for (node, expected) in cases {
            assert_eq!(node.to_string(), expected);
        }
    }
}

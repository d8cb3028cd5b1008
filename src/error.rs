//! Error types for the rule engine

use thiserror::Error;

/// Main error type for the rule engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    #[error("Invalid rule syntax: {0}")]
    Syntax(String),

    #[error("Field {0} not found in data")]
    FieldNotFound(String),

    #[error("Cannot compare {field_type} with {literal_type} using '{operator}'")]
    TypeMismatch {
        operator: String,
        field_type: &'static str,
        literal_type: &'static str,
    },

    #[error("Rule nesting exceeds maximum depth of {0}")]
    DepthExceeded(usize),

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),
}

/// Coarse classification of a [`RuleError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The rule string or submitted AST does not match the grammar
    Syntax,
    /// The AST could not be evaluated against the supplied record
    Evaluation,
    /// An operator outside the supported comparison/combinator set
    UnsupportedOperator,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Evaluation => "EvaluationError",
            ErrorKind::UnsupportedOperator => "UnsupportedOperatorError",
        }
    }
}

impl RuleError {
    pub fn syntax(msg: impl Into<String>) -> Self {
        RuleError::Syntax(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RuleError::Syntax(_) => ErrorKind::Syntax,
            RuleError::FieldNotFound(_)
            | RuleError::TypeMismatch { .. }
            | RuleError::DepthExceeded(_) => ErrorKind::Evaluation,
            RuleError::UnsupportedOperator(_) => ErrorKind::UnsupportedOperator,
        }
    }

    /// Every failure is caused by the caller's rule or record.
    pub fn is_client_fault(&self) -> bool {
        true
    }
}

impl From<serde_json::Error> for RuleError {
    fn from(err: serde_json::Error) -> Self {
        RuleError::Syntax(format!("malformed JSON: {}", err))
    }
}

#[cfg(feature = "python")]
impl From<RuleError> for pyo3::PyErr {
    fn from(err: RuleError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

/// Result type alias for the rule engine
pub type Result<T> = std::result::Result<T, RuleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(RuleError::syntax("x").kind(), ErrorKind::Syntax);
        assert_eq!(
            RuleError::FieldNotFound("age".to_string()).kind(),
            ErrorKind::Evaluation
        );
        assert_eq!(RuleError::DepthExceeded(4).kind(), ErrorKind::Evaluation);
        assert_eq!(
            RuleError::UnsupportedOperator("~".to_string()).kind(),
            ErrorKind::UnsupportedOperator
        );
    }

    #[test]
    fn test_error_messages() {
        let err = RuleError::FieldNotFound("age".to_string());
        assert_eq!(err.to_string(), "Field age not found in data");

        let err = RuleError::TypeMismatch {
            operator: ">".to_string(),
            field_type: "number",
            literal_type: "string",
        };
        assert_eq!(err.to_string(), "Cannot compare number with string using '>'");
    }

    #[test]
    fn test_json_error_is_syntax() {
        let err: RuleError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }
}

//! Conversion between the AST and its nested-mapping wire form
//!
//! ```json
//! {"type": "operator", "value": "AND",
//!  "left":  {"type": "operand", "value": {"field": "age", "operator": ">", "value": "30"},
//!            "left": null, "right": null},
//!  "right": {...}}
//! ```

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::{Result, RuleError};
use crate::rule::ast::{AstNode, Condition};

pub const NODE_TYPE_OPERAND: &str = "operand";
pub const NODE_TYPE_OPERATOR: &str = "operator";

/// Convert an AST into its mapping form
pub fn serialize(node: &AstNode) -> Value {
    match node {
        AstNode::Operand(cond) => json!({
            "type": NODE_TYPE_OPERAND,
            "value": {
                "field": cond.field,
                "operator": cond.operator,
                "value": cond.value,
            },
            "left": Value::Null,
            "right": Value::Null,
        }),
        AstNode::Combinator {
            operator,
            left,
            right,
        } => json!({
            "type": NODE_TYPE_OPERATOR,
            "value": operator,
            "left": serialize(left),
            "right": serialize(right),
        }),
    }
}

impl Serialize for AstNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serialize(self).serialize(serializer)
    }
}

/// Convert a mapping back into an AST.
///
/// `null` and `{}` mean "no rule" and yield `Ok(None)`.
pub fn deserialize(value: &Value) -> Result<Option<AstNode>> {
    deserialize_with_max_depth(value, DEFAULT_MAX_DEPTH)
}

pub fn deserialize_with_max_depth(value: &Value, max_depth: usize) -> Result<Option<AstNode>> {
    if is_empty_rule(value) {
        return Ok(None);
    }
    node_from_value(value, 1, max_depth).map(Some)
}

/// Parse a JSON document and deserialize it
pub fn from_json_str(json: &str) -> Result<Option<AstNode>> {
    let value: Value = serde_json::from_str(json)?;
    deserialize(&value)
}

pub fn to_json_string(node: &AstNode) -> String {
    serialize(node).to_string()
}

fn is_empty_rule(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn node_from_value(value: &Value, depth: usize, max_depth: usize) -> Result<AstNode> {
    if depth > max_depth {
        return Err(RuleError::syntax(format!(
            "Rule nesting exceeds maximum depth of {}",
            max_depth
        )));
    }

    let map = value.as_object().ok_or_else(|| {
        RuleError::syntax(format!(
            "Rule node must be a mapping, found {}",
            json_type_name(value)
        ))
    })?;

    let node_type = match map.get("type") {
        Some(Value::String(s)) => s.as_str(),
        Some(other) => {
            return Err(RuleError::syntax(format!(
                "Rule node 'type' must be a string, found {}",
                json_type_name(other)
            )))
        }
        None => return Err(RuleError::syntax("Rule node is missing 'type'")),
    };

    match node_type {
        NODE_TYPE_OPERAND => {
            let payload = map
                .get("value")
                .ok_or_else(|| RuleError::syntax("Operand node is missing 'value'"))?;
            Ok(AstNode::Operand(condition_from_value(payload)?))
        }
        NODE_TYPE_OPERATOR => {
            let operator = match map.get("value") {
                Some(Value::String(s)) => s.clone(),
                _ => {
                    return Err(RuleError::syntax(
                        "Operator node 'value' must be an operator string",
                    ))
                }
            };
            let left = child(map, "left", depth, max_depth)?;
            let right = child(map, "right", depth, max_depth)?;
            Ok(AstNode::Combinator {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            })
        }
        other => Err(RuleError::syntax(format!("Unknown node type '{}'", other))),
    }
}

fn child(map: &Map<String, Value>, key: &str, depth: usize, max_depth: usize) -> Result<AstNode> {
    match map.get(key) {
        None | Some(Value::Null) => Err(RuleError::syntax(format!(
            "Operator node is missing '{}' child",
            key
        ))),
        Some(value) => node_from_value(value, depth + 1, max_depth),
    }
}

fn condition_from_value(payload: &Value) -> Result<Condition> {
    let map = payload.as_object().ok_or_else(|| {
        RuleError::syntax("Operand 'value' must be a mapping with field, operator and value")
    })?;

    let field = string_entry(map, "field")?;
    let operator = string_entry(map, "operator")?;
    // Numbers and booleans are accepted for the literal and kept in their text form
    let value = match map.get("value") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => {
            return Err(RuleError::syntax(format!(
                "Operand 'value' must be a scalar, found {}",
                json_type_name(other)
            )))
        }
        None => return Err(RuleError::syntax("Operand is missing 'value'")),
    };

    Ok(Condition {
        field,
        operator,
        value,
    })
}

fn string_entry(map: &Map<String, Value>, key: &str) -> Result<String> {
    match map.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(RuleError::syntax(format!(
            "Operand '{}' must be a string, found {}",
            key,
            json_type_name(other)
        ))),
        None => Err(RuleError::syntax(format!("Operand is missing '{}'", key))),
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::rule::parser::parse;

    #[test]
    fn test_serialize_operand() {
        let node = AstNode::operand("age", ">", "30");
        assert_eq!(
            serialize(&node),
            json!({
                "type": "operand",
                "value": {"field": "age", "operator": ">", "value": "30"},
                "left": null,
                "right": null,
            })
        );
    }

    #[test]
    fn test_serialize_combinator() {
        let node = parse("age > 30 AND department = 'Sales'").unwrap();
        let value = serialize(&node);
        assert_eq!(value["type"], "operator");
        assert_eq!(value["value"], "AND");
        assert_eq!(value["left"]["value"]["field"], "age");
        assert_eq!(value["right"]["value"]["value"], "Sales");
    }

    #[test]
    fn test_serde_serialize_matches_mapping() {
        let node = parse("(a = 1 OR b = 2) AND c != 3").unwrap();
        assert_eq!(serde_json::to_value(&node).unwrap(), serialize(&node));
    }

    #[test]
    fn test_round_trip() {
        let node = parse("(age > 30 OR age < 10) AND department = 'Sales' OR x <= 1").unwrap();
        assert_eq!(deserialize(&serialize(&node)).unwrap(), Some(node.clone()));
        assert_eq!(from_json_str(&to_json_string(&node)).unwrap(), Some(node));
    }

    #[test]
    fn test_empty_rule() {
        assert_eq!(deserialize(&Value::Null).unwrap(), None);
        assert_eq!(deserialize(&json!({})).unwrap(), None);
    }

    #[test]
    fn test_operand_children_are_ignored() {
        let value = json!({
            "type": "operand",
            "value": {"field": "age", "operator": ">", "value": "30"},
            "left": {"type": "bogus"},
        });
        assert_eq!(
            deserialize(&value).unwrap(),
            Some(AstNode::operand("age", ">", "30"))
        );
    }

    #[test]
    fn test_numeric_literal_accepted() {
        let value = json!({
            "type": "operand",
            "value": {"field": "age", "operator": ">", "value": 30},
        });
        assert_eq!(
            deserialize(&value).unwrap(),
            Some(AstNode::operand("age", ">", "30"))
        );
    }

    #[test]
    fn test_unknown_combinator_operator_is_kept() {
        let value = json!({
            "type": "operator",
            "value": "XOR",
            "left": serialize(&AstNode::operand("a", "=", "1")),
            "right": serialize(&AstNode::operand("b", "=", "2")),
        });
        match deserialize(&value).unwrap() {
            Some(AstNode::Combinator { operator, .. }) => assert_eq!(operator, "XOR"),
            other => panic!("Expected combinator, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_errors() {
        let operand = serialize(&AstNode::operand("a", "=", "1"));
        let cases = vec![
            json!([1, 2]),
            json!("age > 30"),
            json!({"value": "AND"}),
            json!({"type": 1}),
            json!({"type": "leaf"}),
            json!({"type": "operand"}),
            json!({"type": "operand", "value": "age > 30"}),
            json!({"type": "operand", "value": {"field": "a", "operator": "="}}),
            json!({"type": "operand", "value": {"field": 1, "operator": "=", "value": "1"}}),
            json!({"type": "operand", "value": {"field": "a", "operator": "=", "value": [1]}}),
            json!({"type": "operator", "value": "AND", "left": operand.clone()}),
            json!({"type": "operator", "value": "AND", "left": operand.clone(), "right": null}),
            json!({"type": "operator", "value": "AND", "left": operand.clone(), "right": {}}),
            json!({"type": "operator", "value": {"op": "AND"}, "left": operand.clone(), "right": operand}),
        ];

        for case in cases {
            let err = deserialize(&case).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Syntax, "Expected syntax error for: {}", case);
        }
    }

    #[test]
    fn test_deserialize_max_depth() {
        let node = parse(&vec!["x = 1"; 6].join(" AND ")).unwrap();
        let value = serialize(&node);
        assert!(deserialize_with_max_depth(&value, 6).is_ok());
        assert!(deserialize_with_max_depth(&value, 5).is_err());
    }

    #[test]
    fn test_long_chain_survives_json_text() {
        let node = parse(&vec!["age > 30"; 100].join(" AND ")).unwrap();
        let text = to_json_string(&node);
        assert_eq!(from_json_str(&text).unwrap(), Some(node));
    }
}

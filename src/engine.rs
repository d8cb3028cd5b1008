//! Rule engine bundling configuration and the parsed-rule cache

use serde_json::Value;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::rule::{self, AstNode, Record, RuleCache};

/// Entry point for parsing and evaluating rules under one configuration
pub struct RuleEngine {
    config: EngineConfig,
    cache: RuleCache,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl RuleEngine {
    pub fn new(config: EngineConfig) -> Self {
        let cache = RuleCache::new(config.cache_capacity, config.max_depth);
        Self { config, cache }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &RuleCache {
        &self.cache
    }

    /// Parse a rule string (cached)
    pub fn parse(&self, rule: &str) -> Result<AstNode> {
        self.cache.get_or_parse(rule)
    }

    /// Parse a rule string and return its mapping form
    pub fn create(&self, rule_string: &str) -> Result<Value> {
        let ast = self.parse(rule_string)?;
        Ok(rule::serialize(&ast))
    }

    /// Rebuild an AST from its mapping form; `None` means no rule
    pub fn deserialize(&self, mapping: &Value) -> Result<Option<AstNode>> {
        rule::deserialize_with_max_depth(mapping, self.config.max_depth)
    }

    pub fn evaluate(&self, ast: &AstNode, record: &Record) -> Result<bool> {
        rule::evaluate_with_max_depth(ast, record, self.config.max_depth)
    }

    /// Evaluate a rule submitted in mapping form
    pub fn evaluate_mapping(&self, mapping: &Value, record: &Record) -> Result<bool> {
        match self.deserialize(mapping)? {
            Some(ast) => self.evaluate(&ast, record),
            None => Ok(true),
        }
    }

    /// Parse (cached) and evaluate a rule string in one step
    pub fn check(&self, rule: &str, record: &Record) -> Result<bool> {
        self.cache.check_rule(rule, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_create_then_evaluate_mapping() {
        let engine = RuleEngine::default();
        let mapping = engine.create("age > 30 AND department = 'Sales'").unwrap();
        let record = Record::new().with("age", 35).with("department", "Sales");
        assert!(engine.evaluate_mapping(&mapping, &record).unwrap());
    }

    #[test]
    fn test_empty_mapping_is_true() {
        let engine = RuleEngine::default();
        assert!(engine.evaluate_mapping(&json!({}), &Record::new()).unwrap());
        assert!(engine.evaluate_mapping(&Value::Null, &Record::new()).unwrap());
    }

    #[test]
    fn test_configured_depth_applies_everywhere() {
        let engine = RuleEngine::new(EngineConfig::default().with_max_depth(3));
        let deep = vec!["a = 1"; 4].join(" AND ");

        let err = engine.parse(&deep).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);

        let mapping = RuleEngine::default().create(&deep).unwrap();
        let err = engine.deserialize(&mapping).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);

        let ast = RuleEngine::default().parse(&deep).unwrap();
        let err = engine.evaluate(&ast, &Record::new().with("a", 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Evaluation);
    }

    #[test]
    fn test_check_uses_cache() {
        let engine = RuleEngine::default();
        let record = Record::new().with("age", 35);
        assert!(engine.check("age > 30", &record).unwrap());
        assert!(engine.check("age > 30", &record).unwrap());
        assert_eq!(engine.cache().len(), 1);
    }
}

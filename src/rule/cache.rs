//! Parsed-rule cache with fast hashing

use ahash::AHashMap;
use parking_lot::RwLock;

use crate::config::{DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_DEPTH};
use crate::error::Result;
use crate::rule::ast::AstNode;
use crate::rule::evaluator;
use crate::rule::parser;
use crate::rule::record::Record;

/// Cache of parsed rules keyed by the exact rule string.
///
/// Callers get their own clone of the cached tree. When `capacity` entries
/// are stored, the next miss flushes the whole map.
pub struct RuleCache {
    entries: RwLock<AHashMap<String, AstNode>>,
    capacity: usize,
    max_depth: usize,
}

impl Default for RuleCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, DEFAULT_MAX_DEPTH)
    }
}

impl RuleCache {
    pub fn new(capacity: usize, max_depth: usize) -> Self {
        Self {
            entries: RwLock::new(AHashMap::with_capacity(capacity.min(DEFAULT_CACHE_CAPACITY))),
            capacity,
            max_depth,
        }
    }

    /// Get or parse a rule string, using the cache for repeated rules
    #[inline]
    pub fn get_or_parse(&self, rule: &str) -> Result<AstNode> {
        // Fast path: check read lock first
        {
            let entries = self.entries.read();
            if let Some(ast) = entries.get(rule) {
                tracing::trace!(rule, "rule cache hit");
                return Ok(ast.clone());
            }
        }

        tracing::trace!(rule, "rule cache miss");
        let ast = parser::parse_with_max_depth(rule, self.max_depth)?;

        if self.capacity > 0 {
            let mut entries = self.entries.write();
            if entries.len() >= self.capacity && !entries.contains_key(rule) {
                tracing::debug!(capacity = self.capacity, "rule cache full, flushing");
                entries.clear();
            }
            entries.insert(rule.to_string(), ast.clone());
        }

        Ok(ast)
    }

    /// Check a rule string against a record, using the cached AST.
    /// A blank rule is vacuously true.
    #[inline]
    pub fn check_rule(&self, rule: &str, record: &Record) -> Result<bool> {
        if rule.trim().is_empty() {
            return Ok(true);
        }

        let ast = self.get_or_parse(rule)?;
        evaluator::evaluate_with_max_depth(&ast, record, self.max_depth)
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_hit() {
        let cache = RuleCache::default();
        let record = Record::new().with("age", 35);

        // First call - cache miss
        assert!(cache.check_rule("age > 30", &record).unwrap());
        assert_eq!(cache.len(), 1);

        // Second call - cache hit
        assert!(cache.check_rule("age > 30", &record).unwrap());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_empty_rule() {
        let cache = RuleCache::default();
        assert!(cache.check_rule("", &Record::new()).unwrap());
        assert!(cache.check_rule("   ", &Record::new()).unwrap());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_parse_errors_not_cached() {
        let cache = RuleCache::default();
        assert!(cache.get_or_parse("age > > 30").is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_flush() {
        let cache = RuleCache::new(2, DEFAULT_MAX_DEPTH);
        cache.get_or_parse("a = 1").unwrap();
        cache.get_or_parse("b = 2").unwrap();
        assert_eq!(cache.len(), 2);

        // Re-reading a cached rule never flushes
        cache.get_or_parse("a = 1").unwrap();
        assert_eq!(cache.len(), 2);

        cache.get_or_parse("c = 3").unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_capacity_disables_caching() {
        let cache = RuleCache::new(0, DEFAULT_MAX_DEPTH);
        assert_eq!(
            cache.get_or_parse("a = 1").unwrap(),
            AstNode::operand("a", "=", "1")
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear() {
        let cache = RuleCache::default();
        cache.get_or_parse("a = 1").unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}

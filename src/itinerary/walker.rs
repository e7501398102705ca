//! In-place cost walk over a parsed itinerary.

use serde_json::Value;
use tracing::trace;

use super::cost::{CostFieldMatcher, CostNormalizer};

/// Applies `CostNormalizer` to every cost-bearing scalar in a JSON tree
#[derive(Debug, Clone, Default)]
pub struct CostWalker {
    matcher: CostFieldMatcher,
}

impl CostWalker {
    pub fn new(matcher: CostFieldMatcher) -> Self {
        Self { matcher }
    }

    pub fn matcher(&self) -> &CostFieldMatcher {
        &self.matcher
    }

    /// Rewrite cost fields in place; returns how many were rewritten
    pub fn normalize(&self, value: &mut Value) -> usize {
        self.walk(value, false)
    }

    /// `scalars_are_cost` marks direct scalar children of a breakdown
    /// container, or scalar items of an array held under a cost key
    fn walk(&self, value: &mut Value, scalars_are_cost: bool) -> usize {
        match value {
            Value::Object(map) => {
                let mut rewritten = 0;
                for (key, child) in map.iter_mut() {
                    if self.matcher.is_excluded(key) {
                        continue;
                    }
                    let is_cost = scalars_are_cost || self.matcher.is_cost_key(key);
                    match child {
                        Value::String(_) | Value::Number(_) if is_cost => {
                            let amount = CostNormalizer::to_number(child);
                            trace!(key = %key, amount, "normalized cost field");
                            *child = CostNormalizer::to_value(amount);
                            rewritten += 1;
                        }
                        Value::Object(_) => {
                            rewritten += self.walk(child, self.matcher.is_breakdown_container(key));
                        }
                        Value::Array(_) => {
                            rewritten += self.walk(child, is_cost);
                        }
                        _ => {}
                    }
                }
                rewritten
            }
            Value::Array(items) => {
                let mut rewritten = 0;
                for item in items.iter_mut() {
                    match item {
                        Value::String(_) | Value::Number(_) if scalars_are_cost => {
                            *item = CostNormalizer::to_value(CostNormalizer::to_number(item));
                            rewritten += 1;
                        }
                        Value::Object(_) | Value::Array(_) => {
                            rewritten += self.walk(item, false);
                        }
                        _ => {}
                    }
                }
                rewritten
            }
            _ => 0,
        }
    }
}

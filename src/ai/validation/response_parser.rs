//! Tiered Response Parser
//!
//! Turns raw model text into a `serde_json::Value`, trying recovery strategies
//! in a fixed order and stopping at the first that succeeds:
//!
//! 1. **Strict**: standard JSON
//! 2. **Lenient**: JSON5 subset
//! 3. **Substring**: first `{` to last `}`, then strict and lenient
//! 4. **SandboxEval**: bounded object-literal expression evaluation
//! 5. **StructuralRepair**: close truncated strings and containers
//!
//! Every tier sees the same preprocessed text (trimmed, BOM and code fence
//! removed). The outcome depends only on the input text; the sandbox deadline
//! is the one wall-clock bound.

use serde_json::Value;
use tracing::{debug, warn};

use super::json_repair::{object_substring, preprocess, repair_structure};
use super::literal::{self, Limits};
use crate::ai::timeout::Deadline;
use crate::config::ParserConfig;
use crate::constants::parser::ERROR_PREVIEW_CHARS;
use crate::types::{ParseError, ParseTier};

/// Successful parse with the tier that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub value: Value,
    pub tier: ParseTier,
    /// True for any tier other than strict
    pub was_repaired: bool,
}

impl ParseOutcome {
    fn new(value: Value, tier: ParseTier) -> Self {
        Self {
            value,
            tier,
            was_repaired: tier.is_repair(),
        }
    }
}

/// Stateless parser; one instance can serve any number of requests
#[derive(Debug, Clone, Default)]
pub struct ResponseParser {
    config: ParserConfig,
}

impl ResponseParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn parse(&self, text: &str) -> Result<ParseOutcome, ParseError> {
        let cleaned = preprocess(text);
        let substring = object_substring(&cleaned).filter(|s| s.len() < cleaned.len());

        let mut attempt = Attempt::new(text.len());

        // Tier 1
        match serde_json::from_str::<Value>(&cleaned) {
            Ok(value) => return Ok(attempt.succeed(value, ParseTier::Strict)),
            Err(e) => attempt.fail(ParseTier::Strict, e.to_string()),
        }

        // Tier 2
        match literal::parse_lenient(&cleaned, self.config.max_depth) {
            Ok(value) => return Ok(attempt.succeed(value, ParseTier::Lenient)),
            Err(e) => attempt.fail(ParseTier::Lenient, e.to_string()),
        }

        // Tier 3
        if let Some(slice) = substring {
            let parsed = serde_json::from_str::<Value>(slice)
                .map_err(|e| e.to_string())
                .or_else(|_| {
                    literal::parse_lenient(slice, self.config.max_depth).map_err(|e| e.to_string())
                });
            match parsed {
                Ok(value) => return Ok(attempt.succeed(value, ParseTier::Substring)),
                Err(reason) => attempt.fail(ParseTier::Substring, reason),
            }
        }

        // Tier 4
        let target = substring.unwrap_or(&cleaned);
        let limits = Limits {
            max_depth: self.config.max_depth,
            max_input_bytes: self.config.max_sandbox_input_bytes,
            deadline: Deadline::after(self.config.sandbox_timeout()),
        };
        match literal::evaluate_expression(target, limits) {
            Ok(value) => return Ok(attempt.succeed(value, ParseTier::SandboxEval)),
            Err(e) => attempt.fail(ParseTier::SandboxEval, e.to_string()),
        }

        // Tier 5
        match repair_structure(&cleaned) {
            Some(repaired) => match serde_json::from_str::<Value>(&repaired) {
                Ok(value) => return Ok(attempt.succeed(value, ParseTier::StructuralRepair)),
                Err(e) => attempt.fail(ParseTier::StructuralRepair, e.to_string()),
            },
            None => attempt.fail(
                ParseTier::StructuralRepair,
                "no '{' or '[' to anchor repair".to_string(),
            ),
        }

        let preview: String = cleaned.chars().take(ERROR_PREVIEW_CHARS).collect();
        warn!(
            text_len = text.len(),
            preview = %preview,
            "All parse tiers failed"
        );
        Err(attempt.into_error())
    }
}

/// Bookkeeping for one `parse` call
struct Attempt {
    text_len: usize,
    tiers_tried: Vec<ParseTier>,
    last_reason: String,
}

impl Attempt {
    fn new(text_len: usize) -> Self {
        Self {
            text_len,
            tiers_tried: Vec::with_capacity(ParseTier::ALL.len()),
            last_reason: String::new(),
        }
    }

    fn fail(&mut self, tier: ParseTier, reason: String) {
        debug!(tier = %tier, reason = %reason, "Parse tier failed");
        self.tiers_tried.push(tier);
        self.last_reason = reason;
    }

    fn succeed(self, value: Value, tier: ParseTier) -> ParseOutcome {
        if tier.is_repair() {
            warn!(
                tier = %tier,
                failed_tiers = self.tiers_tried.len(),
                "Model output recovered by repair tier"
            );
        } else {
            debug!("Model output parsed strictly");
        }
        ParseOutcome::new(value, tier)
    }

    fn into_error(self) -> ParseError {
        ParseError {
            text_len: self.text_len,
            tiers_tried: self.tiers_tried,
            reason: self.last_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    const TRUNCATED_SHIMLA: &str = r#"{
  "currency": "INR",
  "totalEstimatedCost": "₹ 18,500",
  "dayPlans": [
    {
      "day": 1,
      "location": "Shimla",
      "morning": [
        {
          "title": "Walk & Photography in Shimla Mall Road & Ridge",
          "description": "Stroll throu"#;

    fn parser() -> ResponseParser {
        ResponseParser::default()
    }

    #[test]
    fn test_valid_json_uses_strict_tier() {
        let text = r#"{"title": "Hills", "days": [1, 2], "budget": {"total": 100.5}}"#;
        let outcome = parser().parse(text).unwrap();
        assert_eq!(outcome.tier, ParseTier::Strict);
        assert!(!outcome.was_repaired);
        assert_eq!(outcome.value, serde_json::from_str::<Value>(text).unwrap());
    }

    #[test]
    fn test_fenced_json_is_still_strict() {
        let outcome = parser().parse("```json\n{\"a\": 1}\n```").unwrap();
        assert_eq!(outcome.tier, ParseTier::Strict);
        assert_eq!(outcome.value, json!({"a": 1}));
    }

    #[test]
    fn test_lenient_tier() {
        let outcome = parser().parse("{title: 'Hills', days: 3,}").unwrap();
        assert_eq!(outcome.tier, ParseTier::Lenient);
        assert!(outcome.was_repaired);
        assert_eq!(outcome.value, json!({"title": "Hills", "days": 3}));
    }

    #[test]
    fn test_prose_wrapped_uses_substring_tier() {
        let outcome = parser()
            .parse(r#"Sure, here: {"a":1} Hope that helps"#)
            .unwrap();
        assert_eq!(outcome.tier, ParseTier::Substring);
        assert!(outcome.was_repaired);
        assert_eq!(outcome.value, json!({"a": 1}));
    }

    #[test]
    fn test_prose_wrapped_lenient_object_uses_substring_tier() {
        let outcome = parser()
            .parse("Here is your plan:\n{title: 'Goa', nights: 4,}\nEnjoy!")
            .unwrap();
        assert_eq!(outcome.tier, ParseTier::Substring);
        assert_eq!(outcome.value, json!({"title": "Goa", "nights": 4}));
    }

    #[test]
    fn test_expression_uses_sandbox_tier() {
        let outcome = parser()
            .parse("const plan = {total: 800 + 6000, note: undefined}")
            .unwrap();
        assert_eq!(outcome.tier, ParseTier::SandboxEval);
        assert_eq!(outcome.value, json!({"total": 6800}));
    }

    #[test]
    fn test_truncated_payload_uses_structural_repair() {
        let outcome = parser().parse(TRUNCATED_SHIMLA).unwrap();
        assert_eq!(outcome.tier, ParseTier::StructuralRepair);
        assert!(outcome.was_repaired);

        let value = outcome.value;
        assert_eq!(value["currency"], json!("INR"));
        assert_eq!(value["dayPlans"][0]["day"], json!(1));
        assert_eq!(
            value["dayPlans"][0]["morning"][0]["title"],
            json!("Walk & Photography in Shimla Mall Road & Ridge")
        );
        assert_eq!(
            value["dayPlans"][0]["morning"][0]["description"],
            json!("Stroll throu")
        );
    }

    #[test]
    fn test_unparseable_reports_tiers() {
        let err = parser().parse("I'm sorry, I can't help with that.").unwrap_err();
        assert_eq!(err.text_len, 34);
        assert_eq!(
            err.tiers_tried,
            vec![
                ParseTier::Strict,
                ParseTier::Lenient,
                ParseTier::SandboxEval,
                ParseTier::StructuralRepair
            ]
        );
    }

    #[test]
    fn test_empty_input_is_unparseable() {
        let err = parser().parse("   ").unwrap_err();
        assert_eq!(err.text_len, 3);
        assert!(err.tiers_tried.contains(&ParseTier::StructuralRepair));
    }

    #[test]
    fn test_oversized_input_skips_sandbox() {
        let parser = ResponseParser::new(ParserConfig {
            max_sandbox_input_bytes: 8,
            ..ParserConfig::default()
        });
        let err = parser.parse("{total: 1 + 2} and then some prose").unwrap_err();
        assert!(err.tiers_tried.contains(&ParseTier::SandboxEval));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let inputs = [
            r#"{"a": 1}"#,
            "{a: 1,}",
            r#"noise {"a": 1} noise"#,
            TRUNCATED_SHIMLA,
            "not json",
        ];
        for input in inputs {
            let first = parser().parse(input);
            for _ in 0..3 {
                assert_eq!(parser().parse(input), first);
            }
        }
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            (-1.0e9f64..1.0e9).prop_map(|f| json!(f)),
            ".*".prop_map(Value::String),
        ];
        leaf.prop_recursive(4, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::hash_map(".*", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_valid_json_parses_strictly(value in arb_json()) {
            let text = serde_json::to_string(&value).unwrap();
            let outcome = parser().parse(&text).unwrap();
            prop_assert_eq!(outcome.tier, ParseTier::Strict);
            prop_assert_eq!(outcome.value, serde_json::from_str::<Value>(&text).unwrap());
        }

        #[test]
        fn prop_parse_never_panics(text in ".{0,200}") {
            let _ = parser().parse(&text);
        }
    }
}

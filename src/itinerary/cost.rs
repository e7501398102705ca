//! Cost Normalization
//!
//! Models write money the way people do: `"₹ 6,800"`, `"$40 per person"`,
//! `"₹ 800 + ₹ 6,000 = ₹ 6,800"`. `CostNormalizer` reduces any of these to a
//! single `f64` and never fails; unreadable input becomes `0.0`.
//!
//! ## Extraction order
//!
//! 1. Numbers pass through (non-finite become `0.0`)
//! 2. First numeric token after the last `=` (computed totals)
//! 3. Last numeric token in the string (running totals are written last)
//! 4. Leading numeric run after dropping everything but `0-9 , . -`
//! 5. `0.0`
//!
//! A leading `-` is never read as a sign by steps 2-3, so `"-500"` yields
//! `500`. Ranges such as `"500-800"` share that character and are not
//! disambiguated.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Number, Value};

use crate::config::CostConfig;

/// Digits with optional thousands separators and an optional fraction
static NUMERIC_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("numeric token pattern is valid")
});

static LEADING_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?[\d,]*\.?\d+").expect("leading run pattern is valid")
});

// =============================================================================
// CostNormalizer
// =============================================================================

/// Free-form cost value → canonical number
pub struct CostNormalizer;

impl CostNormalizer {
    /// Normalize any JSON value; only strings and numbers can be non-zero
    pub fn to_number(value: &Value) -> f64 {
        match value {
            Value::Number(n) => Self::from_f64(n.as_f64().unwrap_or(0.0)),
            Value::String(s) => Self::parse_str(s),
            _ => 0.0,
        }
    }

    pub fn from_f64(n: f64) -> f64 {
        if n.is_finite() { n } else { 0.0 }
    }

    pub fn parse_str(text: &str) -> f64 {
        if let Some(eq) = text.rfind('=')
            && let Some(token) = NUMERIC_TOKEN.find(&text[eq + 1..])
            && let Some(n) = parse_token(token.as_str())
        {
            return n;
        }

        if let Some(token) = NUMERIC_TOKEN.find_iter(text).last()
            && let Some(n) = parse_token(token.as_str())
        {
            return n;
        }

        // Unreachable once the last-token rule has run; kept as the final
        // documented fallback step.
        let stripped: String = text
            .chars()
            .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
            .collect();
        if let Some(run) = LEADING_RUN.find(&stripped)
            && let Some(n) = parse_token(run.as_str())
        {
            return n;
        }

        0.0
    }

    /// JSON number for a normalized amount; whole amounts stay integers
    pub fn to_value(amount: f64) -> Value {
        const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
        let amount = Self::from_f64(amount);
        if amount.fract() == 0.0 && amount.abs() <= MAX_SAFE {
            return Value::Number(Number::from(amount as i64));
        }
        Number::from_f64(amount)
            .map(Value::Number)
            .unwrap_or_else(|| Value::Number(Number::from(0)))
    }
}

fn parse_token(token: &str) -> Option<f64> {
    let cleaned = token.replace(',', "");
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

// =============================================================================
// CostFieldMatcher
// =============================================================================

/// Decides which itinerary keys hold money
///
/// All comparisons are ASCII case-insensitive.
#[derive(Debug, Clone)]
pub struct CostFieldMatcher {
    suffixes: Vec<String>,
    breakdown_containers: Vec<String>,
    exclusions: Vec<String>,
}

impl Default for CostFieldMatcher {
    fn default() -> Self {
        Self::new(&CostConfig::default())
    }
}

impl CostFieldMatcher {
    pub fn new(config: &CostConfig) -> Self {
        fn lowered(items: &[String]) -> Vec<String> {
            items
                .iter()
                .map(|s| s.trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        }

        Self {
            suffixes: lowered(&config.suffixes),
            breakdown_containers: lowered(&config.breakdown_containers),
            exclusions: lowered(&config.exclusions),
        }
    }

    /// Key equals or ends with a cost suffix and is not excluded
    pub fn is_cost_key(&self, key: &str) -> bool {
        let key = key.to_ascii_lowercase();
        !self.exclusions.contains(&key) && self.suffixes.iter().any(|s| key.ends_with(s.as_str()))
    }

    /// Object under this key has only cost-bearing scalar members
    pub fn is_breakdown_container(&self, key: &str) -> bool {
        let key = key.to_ascii_lowercase();
        self.breakdown_containers.contains(&key)
    }

    pub fn is_excluded(&self, key: &str) -> bool {
        let key = key.to_ascii_lowercase();
        self.exclusions.contains(&key)
    }
}

//! Parsed itinerary and audit-log types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{ForecastEntry, TokenUsage};

/// Recovery strategy that produced a parsed value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParseTier {
    Strict,
    Lenient,
    Substring,
    SandboxEval,
    StructuralRepair,
}

impl ParseTier {
    pub const ALL: [ParseTier; 5] = [
        ParseTier::Strict,
        ParseTier::Lenient,
        ParseTier::Substring,
        ParseTier::SandboxEval,
        ParseTier::StructuralRepair,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParseTier::Strict => "strict",
            ParseTier::Lenient => "lenient",
            ParseTier::Substring => "substring",
            ParseTier::SandboxEval => "sandboxEval",
            ParseTier::StructuralRepair => "structuralRepair",
        }
    }

    /// Any tier past strict JSON counts as a repair
    pub fn is_repair(&self) -> bool {
        !matches!(self, ParseTier::Strict)
    }
}

impl std::fmt::Display for ParseTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to the weather step for one itinerary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WeatherStatus {
    NotRequested,
    Attached,
    /// Requested, but the coordinator has no aggregator
    NotConfigured,
}

/// A fully normalized itinerary, ready for persistence
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedItinerary {
    /// Model output with cost fields replaced by canonical numbers
    pub content: Value,
    pub was_repaired: bool,
    pub parse_tier: ParseTier,
    /// Per-destination weather, present when the request asked for it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<Vec<ForecastEntry>>,
    pub weather_status: WeatherStatus,
    /// Number of cost-bearing fields rewritten
    pub normalized_cost_fields: usize,
}

impl ParsedItinerary {
    /// Render the stored document: content with weather under `weatherReference`
    pub fn to_document(&self) -> Value {
        let mut doc = self.content.clone();
        if let (Value::Object(map), Some(weather)) = (&mut doc, &self.weather) {
            let entries = serde_json::to_value(weather).unwrap_or(Value::Array(Vec::new()));
            map.insert("weatherReference".to_string(), entries);
        }
        doc
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Success,
    Failed,
}

/// Audit record for one model call, handed to the persistence collaborator
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiCallLogEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub model_name: String,
    pub raw_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed: Option<Value>,
    pub was_repaired: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_tier: Option<ParseTier>,
    pub status: CallStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub token_usage: TokenUsage,
    /// Model latency as reported by the caller
    pub response_time_ms: u64,
    /// Time spent inside this crate
    pub processing_ms: u64,
}

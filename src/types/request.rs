//! Generation request and raw model response types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::GenerationError;
use crate::constants::request as limits;

/// Budget tier requested by the traveller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    Budget,
    #[default]
    Moderate,
    Luxury,
}

impl std::fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BudgetTier::Budget => write!(f, "budget"),
            BudgetTier::Moderate => write!(f, "moderate"),
            BudgetTier::Luxury => write!(f, "luxury"),
        }
    }
}

impl std::str::FromStr for BudgetTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "budget" => Ok(BudgetTier::Budget),
            "moderate" => Ok(BudgetTier::Moderate),
            "luxury" => Ok(BudgetTier::Luxury),
            _ => Err(format!(
                "Unknown budget tier: {}. Valid values: budget, moderate, luxury",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Travelers {
    pub adults: u32,
    pub children: u32,
}

impl Default for Travelers {
    fn default() -> Self {
        Self {
            adults: 1,
            children: 0,
        }
    }
}

/// One user's request for an itinerary; immutable once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub origin: String,
    pub destinations: Vec<String>,
    pub start_date: NaiveDate,
    pub duration_days: u32,
    #[serde(default)]
    pub budget: BudgetTier,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub travel_style: String,
    #[serde(default)]
    pub travelers: Travelers,
    #[serde(default)]
    pub include_weather_reference: bool,
    #[serde(default)]
    pub include_cost_breakdown: bool,
}

impl GenerationRequest {
    pub fn new(
        origin: impl Into<String>,
        destinations: Vec<String>,
        start_date: NaiveDate,
        duration_days: u32,
    ) -> Self {
        Self {
            origin: origin.into(),
            destinations,
            start_date,
            duration_days,
            budget: BudgetTier::default(),
            interests: Vec::new(),
            travel_style: String::new(),
            travelers: Travelers::default(),
            include_weather_reference: false,
            include_cost_breakdown: false,
        }
    }

    pub fn with_weather(mut self, enabled: bool) -> Self {
        self.include_weather_reference = enabled;
        self
    }

    /// Reject requests the rest of the pipeline cannot honour
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.destinations.is_empty() {
            return Err(GenerationError::InvalidRequest(
                "at least one destination is required".to_string(),
            ));
        }
        if self.destinations.len() > limits::MAX_DESTINATIONS {
            return Err(GenerationError::InvalidRequest(format!(
                "at most {} destinations are allowed, got {}",
                limits::MAX_DESTINATIONS,
                self.destinations.len()
            )));
        }
        if let Some(idx) = self.destinations.iter().position(|d| d.trim().is_empty()) {
            return Err(GenerationError::InvalidRequest(format!(
                "destination #{} is blank",
                idx + 1
            )));
        }
        if !(1..=limits::MAX_DURATION_DAYS).contains(&self.duration_days) {
            return Err(GenerationError::InvalidRequest(format!(
                "duration must be between 1 and {} days, got {}",
                limits::MAX_DURATION_DAYS,
                self.duration_days
            )));
        }
        if self.travelers.adults == 0 {
            return Err(GenerationError::InvalidRequest(
                "at least one adult traveller is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Token usage reported by the model collaborator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Text produced by the external model plus call metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawModelResponse {
    pub text: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub token_usage: TokenUsage,
    #[serde(default)]
    pub response_time_ms: u64,
}

impl RawModelResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

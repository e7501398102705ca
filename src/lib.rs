//! itinerary-guard - Trust Boundary for AI-Generated Itineraries
//!
//! Turns the unreliable text an itinerary-generation model produces into
//! canonical, strongly-typed data the rest of a travel application can store
//! and render.
//!
//! ## Core Features
//!
//! - **Tiered Recovery Parsing**: strict JSON, lenient JSON5, substring
//!   extraction, a bounded expression evaluator and structural repair
//! - **Cost Normalization**: free-form cost strings reduced to one number
//! - **Weather Enrichment**: live forecasts inside the provider horizon,
//!   seasonal estimates beyond it, a stable output shape either way
//!
//! ## Quick Start
//!
//! ```ignore
//! use itinerary_guard::{ConfigLoader, GenerationCoordinator, WeatherAggregator};
//!
//! let config = ConfigLoader::load()?;
//! let weather = WeatherAggregator::open_meteo(&config.weather)?;
//! let coordinator = GenerationCoordinator::from_config(&config).with_weather(weather);
//! let itinerary = coordinator.process(&request, &raw_response).await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: model-output parsing and operation timeouts
//! - [`itinerary`]: cost normalization and the generation coordinator
//! - [`weather`]: forecast aggregation and provider adapters
//! - [`config`]: layered configuration
//! - [`types`]: shared domain types and errors

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod itinerary;
pub mod types;
pub mod weather;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, CostConfig, ParserConfig, WeatherConfig};

// Error Types
pub use types::error::{GenerationError, GuardError, ParseError, Result};

// Domain Types
pub use types::{
    AiCallLogEntry, BudgetTier, CallStatus, Coordinates, DateRange, FallbackReason, ForecastEntry,
    ForecastSource, ForecastSummary, GenerationRequest, ParseTier, ParsedItinerary,
    RawModelResponse, TokenUsage, Travelers, WeatherStatus,
};

// Parsing
pub use ai::validation::{ParseOutcome, ResponseParser};

// Itinerary processing
pub use itinerary::{
    CostFieldMatcher, CostNormalizer, CostWalker, GenerationCoordinator, GenerationOutcome,
};

// Weather
pub use weather::{
    DailyWeather, ForecastProvider, Geocoder, SeasonalEstimator, WeatherAggregator,
};

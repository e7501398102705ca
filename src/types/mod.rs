pub mod error;
pub mod forecast;
pub mod itinerary;
pub mod request;

pub use error::{GenerationError, GuardError, ParseError, Result};
pub use forecast::{
    Coordinates, DateRange, FallbackReason, ForecastEntry, ForecastSource, ForecastSummary,
};
pub use itinerary::{AiCallLogEntry, CallStatus, ParseTier, ParsedItinerary, WeatherStatus};
pub use request::{BudgetTier, GenerationRequest, RawModelResponse, TokenUsage, Travelers};

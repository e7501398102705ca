//! Itinerary Normalization
//!
//! Turns a parsed model response into a `ParsedItinerary`: cost fields become
//! canonical numbers and weather references are attached on request.

mod coordinator;
mod cost;
mod walker;

pub use coordinator::{GenerationCoordinator, GenerationOutcome};
pub use cost::{CostFieldMatcher, CostNormalizer};
pub use walker::CostWalker;

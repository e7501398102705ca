//! Configuration Management
//!
//! Unified configuration system with hierarchical resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/itinerary-guard/config.toml)
//! 3. Project config (.itinerary-guard/config.toml)
//! 4. Environment variables (ITINERARY_GUARD_*)

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::*;

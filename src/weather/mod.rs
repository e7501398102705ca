//! Weather Reference Enrichment
//!
//! Produces one `ForecastEntry` per destination with the same shape whether
//! the numbers come from a live forecast, a seasonal estimate, or nowhere.
//!
//! ## Collaborators
//!
//! - [`Geocoder`]: destination name → coordinates
//! - [`ForecastProvider`]: live daily forecast within a limited horizon
//! - [`SeasonalEstimator`]: climatological fallback for any date
//!
//! Open-Meteo implementations of all three live in [`open_meteo`] and
//! [`seasonal`].

mod aggregator;
pub mod open_meteo;
pub mod seasonal;
mod summary;

pub use aggregator::WeatherAggregator;
pub use open_meteo::{OpenMeteoForecast, OpenMeteoGeocoder, weather_code_to_description};
pub use seasonal::ArchiveSeasonalEstimator;
pub use summary::summarize;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::types::{Coordinates, DateRange, Result};

/// One day of weather as reported by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyWeather {
    pub date: NaiveDate,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Daily total in mm
    pub precipitation: f64,
    /// Human-readable condition label
    pub condition: String,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` means the name is unknown, not that the lookup failed
    async fn resolve(&self, destination: &str) -> Result<Option<Coordinates>>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Daily forecast for every day of `range` the provider knows about
    async fn daily_forecast(
        &self,
        coordinates: Coordinates,
        range: &DateRange,
    ) -> Result<Vec<DailyWeather>>;

    /// Days ahead (from today) the provider can forecast
    fn horizon_days(&self) -> u32;

    fn name(&self) -> &str;
}

#[async_trait]
pub trait SeasonalEstimator: Send + Sync {
    /// Typical daily weather for `range`, seeded with location and month
    async fn estimate(
        &self,
        coordinates: Coordinates,
        range: &DateRange,
        month: u32,
    ) -> Result<Vec<DailyWeather>>;

    fn name(&self) -> &str;
}

pub type SharedGeocoder = Arc<dyn Geocoder>;
pub type SharedForecastProvider = Arc<dyn ForecastProvider>;
pub type SharedSeasonalEstimator = Arc<dyn SeasonalEstimator>;

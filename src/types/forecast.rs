//! Weather-reference types attached to itineraries.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Resolved geographic position of a destination
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Half-open UTC range `[start_date, end_date)` anchored at midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl DateRange {
    /// Calendar arithmetic only; never touches local time zones.
    ///
    /// An end past the last representable date saturates to it.
    pub fn from_start(start: NaiveDate, duration_days: u32) -> Self {
        let end = start
            .checked_add_days(Days::new(u64::from(duration_days)))
            .unwrap_or(NaiveDate::MAX);
        Self {
            start_date: start.and_time(NaiveTime::MIN).and_utc(),
            end_date: end.and_time(NaiveTime::MIN).and_utc(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        self.start_date.date_naive()
    }

    /// Last calendar day inside the range (the range is end-exclusive)
    pub fn last_day(&self) -> NaiveDate {
        if self.end_date > self.start_date {
            (self.end_date - chrono::Duration::days(1)).date_naive()
        } else {
            self.first_day()
        }
    }

    pub fn num_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Month of year (1-12) the range starts in
    pub fn month(&self) -> u32 {
        self.start_date.month()
    }

    pub fn contains_day(&self, day: NaiveDate) -> bool {
        day >= self.first_day() && day <= self.last_day() && self.num_days() > 0
    }
}

/// Where a forecast summary's numbers came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForecastSource {
    #[serde(rename = "forecast")]
    Forecast,
    #[serde(rename = "seasonal-ai")]
    SeasonalAi,
}

impl ForecastSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastSource::Forecast => "forecast",
            ForecastSource::SeasonalAi => "seasonal-ai",
        }
    }
}

/// Why the live forecast path was not used; kept for logs, never serialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    BeyondHorizon,
    PastDate,
    ProviderError,
    EmptyForecast,
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::BeyondHorizon => write!(f, "beyond_horizon"),
            FallbackReason::PastDate => write!(f, "past_date"),
            FallbackReason::ProviderError => write!(f, "provider_error"),
            FallbackReason::EmptyForecast => write!(f, "empty_forecast"),
        }
    }
}

/// Aggregated weather for one destination over the trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastSummary {
    pub min_temp: f64,
    pub max_temp: f64,
    pub avg_min_temp: f64,
    pub avg_max_temp: f64,
    /// Most frequent daily condition label
    pub conditions: String,
    /// Mean daily precipitation in mm
    pub avg_precipitation: f64,
    pub recommendations: Vec<String>,
    pub estimated: bool,
    pub source: ForecastSource,
    pub days_covered: usize,
}

/// Weather reference for one destination; `date_range` is always set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastEntry {
    pub destination: String,
    pub coordinates: Option<Coordinates>,
    pub date_range: DateRange,
    pub forecast_summary: Option<ForecastSummary>,
    #[serde(skip)]
    pub fallback_reason: Option<FallbackReason>,
}

impl ForecastEntry {
    /// Entry with no usable weather data
    pub fn empty(
        destination: impl Into<String>,
        coordinates: Option<Coordinates>,
        date_range: DateRange,
    ) -> Self {
        Self {
            destination: destination.into(),
            coordinates,
            date_range,
            forecast_summary: None,
            fallback_reason: None,
        }
    }
}

//! Per-destination weather aggregation with seasonal fallback.
//!
//! Decision per destination:
//!
//! ```text
//! coordinates? ── no ──▶ entry without summary
//!      │ yes
//! in horizon? ── yes ──▶ live forecast ── ok, ≥1 day ──▶ source = forecast
//!      │ no                   │ error / empty
//!      ▼                      ▼
//!   seasonal estimator ── ok, ≥1 day ──▶ source = seasonal-ai, estimated
//!      │ error / empty
//!      ▼
//!   entry without summary
//! ```
//!
//! Every path stamps the same `DateRange`. Failures never cross destinations.

use chrono::{NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::summary::summarize;
use super::{
    ArchiveSeasonalEstimator, OpenMeteoForecast, OpenMeteoGeocoder, SharedForecastProvider,
    SharedGeocoder, SharedSeasonalEstimator,
};
use crate::ai::timeout::with_timeout;
use crate::config::WeatherConfig;
use crate::types::{
    Coordinates, DateRange, FallbackReason, ForecastEntry, ForecastSource, ForecastSummary,
};

pub struct WeatherAggregator {
    geocoder: SharedGeocoder,
    forecast: SharedForecastProvider,
    seasonal: SharedSeasonalEstimator,
    max_concurrency: usize,
    call_timeout: Duration,
}

impl WeatherAggregator {
    pub fn new(
        geocoder: SharedGeocoder,
        forecast: SharedForecastProvider,
        seasonal: SharedSeasonalEstimator,
        config: &WeatherConfig,
    ) -> Self {
        Self {
            geocoder,
            forecast,
            seasonal,
            max_concurrency: config.max_concurrency.max(1),
            call_timeout: config.request_timeout(),
        }
    }

    /// Aggregator wired to the Open-Meteo geocoding, forecast and archive APIs
    pub fn open_meteo(config: &WeatherConfig) -> crate::types::Result<Self> {
        Ok(Self::new(
            Arc::new(OpenMeteoGeocoder::new(config)?),
            Arc::new(OpenMeteoForecast::new(config)?),
            Arc::new(ArchiveSeasonalEstimator::new(config)?),
            config,
        ))
    }

    // =========================================================================
    // Batch
    // =========================================================================

    /// Geocode and aggregate every destination, preserving input order
    pub async fn aggregate_all(
        &self,
        destinations: &[String],
        start_date: NaiveDate,
        duration_days: u32,
    ) -> Vec<ForecastEntry> {
        self.aggregate_all_at(destinations, start_date, duration_days, Utc::now().date_naive())
            .await
    }

    /// `aggregate_all` against an explicit "today"
    pub async fn aggregate_all_at(
        &self,
        destinations: &[String],
        start_date: NaiveDate,
        duration_days: u32,
        today: NaiveDate,
    ) -> Vec<ForecastEntry> {
        if destinations.is_empty() {
            return Vec::new();
        }
        let workers = destinations.len().min(self.max_concurrency);

        let entries: Vec<ForecastEntry> = stream::iter(destinations.iter())
            .map(|destination| async move {
                let coordinates = self.geocode(destination).await;
                self.aggregate_at(destination, coordinates, start_date, duration_days, today)
                    .await
            })
            .buffered(workers)
            .collect()
            .await;

        let with_summary = entries.iter().filter(|e| e.forecast_summary.is_some()).count();
        info!(
            destinations = entries.len(),
            with_summary, "Weather reference aggregated"
        );
        entries
    }

    async fn geocode(&self, destination: &str) -> Option<Coordinates> {
        let operation = format!("geocode {}", destination);
        match with_timeout(self.call_timeout, self.geocoder.resolve(destination), &operation).await
        {
            Ok(Some(coords)) if coords.is_valid() => Some(coords),
            Ok(Some(coords)) => {
                warn!(
                    destination,
                    latitude = coords.latitude,
                    longitude = coords.longitude,
                    "Geocoder returned out-of-range coordinates"
                );
                None
            }
            Ok(None) => {
                warn!(destination, geocoder = self.geocoder.name(), "Destination not found");
                None
            }
            Err(e) => {
                warn!(destination, geocoder = self.geocoder.name(), error = %e, "Geocoding failed");
                None
            }
        }
    }

    // =========================================================================
    // Single destination
    // =========================================================================

    pub async fn aggregate(
        &self,
        destination: &str,
        coordinates: Option<Coordinates>,
        start_date: NaiveDate,
        duration_days: u32,
    ) -> ForecastEntry {
        self.aggregate_at(
            destination,
            coordinates,
            start_date,
            duration_days,
            Utc::now().date_naive(),
        )
        .await
    }

    /// `aggregate` against an explicit "today"; horizon checks use it
    pub async fn aggregate_at(
        &self,
        destination: &str,
        coordinates: Option<Coordinates>,
        start_date: NaiveDate,
        duration_days: u32,
        today: NaiveDate,
    ) -> ForecastEntry {
        let range = DateRange::from_start(start_date, duration_days);
        let mut entry = ForecastEntry::empty(destination, coordinates, range);

        let Some(coords) = coordinates else {
            debug!(destination, "No coordinates; weather reference left empty");
            return entry;
        };

        let reason = match self.horizon_check(&range, today) {
            Ok(()) => match self.live_forecast(destination, coords, &range).await {
                Ok(summary) => {
                    entry.forecast_summary = Some(summary);
                    return entry;
                }
                Err(reason) => reason,
            },
            Err(reason) => reason,
        };

        debug!(destination, reason = %reason, "Falling back to seasonal estimate");
        entry.fallback_reason = Some(reason);
        entry.forecast_summary = self.seasonal_estimate(destination, coords, &range).await;
        entry
    }

    /// Whole range must lie in `[today, today + horizon)`
    fn horizon_check(&self, range: &DateRange, today: NaiveDate) -> Result<(), FallbackReason> {
        if range.first_day() < today {
            return Err(FallbackReason::PastDate);
        }
        let last_offset = (range.last_day() - today).num_days();
        if last_offset >= i64::from(self.forecast.horizon_days()) {
            return Err(FallbackReason::BeyondHorizon);
        }
        Ok(())
    }

    async fn live_forecast(
        &self,
        destination: &str,
        coords: Coordinates,
        range: &DateRange,
    ) -> Result<ForecastSummary, FallbackReason> {
        let operation = format!("forecast {}", destination);
        let days = with_timeout(
            self.call_timeout,
            self.forecast.daily_forecast(coords, range),
            &operation,
        )
        .await
        .map_err(|e| {
            warn!(destination, provider = self.forecast.name(), error = %e, "Forecast provider failed");
            FallbackReason::ProviderError
        })?;

        let in_range: Vec<_> = days.into_iter().filter(|d| range.contains_day(d.date)).collect();
        summarize(&in_range, ForecastSource::Forecast).ok_or(FallbackReason::EmptyForecast)
    }

    async fn seasonal_estimate(
        &self,
        destination: &str,
        coords: Coordinates,
        range: &DateRange,
    ) -> Option<ForecastSummary> {
        let operation = format!("seasonal estimate {}", destination);
        match with_timeout(
            self.call_timeout,
            self.seasonal.estimate(coords, range, range.month()),
            &operation,
        )
        .await
        {
            Ok(days) => {
                let summary = summarize(&days, ForecastSource::SeasonalAi);
                if summary.is_none() {
                    warn!(destination, estimator = self.seasonal.name(), "Seasonal estimate was empty");
                }
                summary
            }
            Err(e) => {
                warn!(destination, estimator = self.seasonal.name(), error = %e, "Seasonal estimate failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GuardError, Result};
    use crate::weather::{DailyWeather, ForecastProvider, Geocoder, SeasonalEstimator};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // =========================================================================
    // Mock collaborators
    // =========================================================================

    struct MockGeocoder;

    #[async_trait]
    impl Geocoder for MockGeocoder {
        async fn resolve(&self, destination: &str) -> Result<Option<Coordinates>> {
            match destination {
                "Shimla" => Ok(Some(Coordinates::new(31.1, 77.17))),
                "Manali" => Ok(Some(Coordinates::new(32.24, 77.19))),
                "Broken" => Err(GuardError::provider("mock-geo", "HTTP 500")),
                "Slow" => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(Some(Coordinates::new(1.0, 1.0)))
                }
                _ => Ok(None),
            }
        }

        fn name(&self) -> &str {
            "mock-geo"
        }
    }

    struct MockForecast {
        fail: bool,
        empty: bool,
        calls: AtomicUsize,
    }

    impl MockForecast {
        fn ok() -> Self {
            Self {
                fail: false,
                empty: false,
                calls: AtomicUsize::new(0),
            }
        }
    }

    fn days_for(range: &DateRange, min: f64, max: f64) -> Vec<DailyWeather> {
        (0..range.num_days())
            .map(|i| DailyWeather {
                date: range.first_day() + chrono::Duration::days(i),
                temp_min: min,
                temp_max: max,
                precipitation: 0.0,
                condition: "Clear sky".to_string(),
            })
            .collect()
    }

    #[async_trait]
    impl ForecastProvider for MockForecast {
        async fn daily_forecast(
            &self,
            _coordinates: Coordinates,
            range: &DateRange,
        ) -> Result<Vec<DailyWeather>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(GuardError::provider("mock-forecast", "HTTP 503"));
            }
            if self.empty {
                return Ok(Vec::new());
            }
            Ok(days_for(range, 12.0, 22.0))
        }

        fn horizon_days(&self) -> u32 {
            14
        }

        fn name(&self) -> &str {
            "mock-forecast"
        }
    }

    struct MockSeasonal {
        fail: bool,
    }

    #[async_trait]
    impl SeasonalEstimator for MockSeasonal {
        async fn estimate(
            &self,
            _coordinates: Coordinates,
            range: &DateRange,
            _month: u32,
        ) -> Result<Vec<DailyWeather>> {
            if self.fail {
                return Err(GuardError::provider("mock-seasonal", "unavailable"));
            }
            Ok(days_for(range, 2.0, 9.0))
        }

        fn name(&self) -> &str {
            "mock-seasonal"
        }
    }

    fn aggregator_with(forecast: MockForecast, seasonal_fails: bool) -> WeatherAggregator {
        let config = WeatherConfig {
            request_timeout_secs: 1,
            ..WeatherConfig::default()
        };
        WeatherAggregator::new(
            Arc::new(MockGeocoder),
            Arc::new(forecast),
            Arc::new(MockSeasonal {
                fail: seasonal_fails,
            }),
            &config,
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const SHIMLA: Coordinates = Coordinates {
        latitude: 31.1,
        longitude: 77.17,
    };

    // =========================================================================
    // Tests
    // =========================================================================

    #[tokio::test]
    async fn test_in_horizon_uses_live_forecast() {
        let today = date(2026, 5, 1);
        let start = date(2026, 5, 3);
        let entry = aggregator_with(MockForecast::ok(), false)
            .aggregate_at("Shimla", Some(SHIMLA), start, 7, today)
            .await;

        let summary = entry.forecast_summary.unwrap();
        assert_eq!(summary.source, ForecastSource::Forecast);
        assert!(!summary.estimated);
        assert_eq!(summary.days_covered, 7);
        assert_eq!(entry.date_range.end_date.date_naive(), date(2026, 5, 10));
        assert_eq!(entry.date_range, DateRange::from_start(start, 7));
        assert_eq!(entry.fallback_reason, None);
    }

    #[tokio::test]
    async fn test_beyond_horizon_uses_seasonal_estimate() {
        let today = date(2026, 5, 1);
        let start = date(2026, 9, 15);
        let forecast = MockForecast::ok();
        let aggregator = aggregator_with(forecast, false);
        let entry = aggregator
            .aggregate_at("Shimla", Some(SHIMLA), start, 7, today)
            .await;

        let summary = entry.forecast_summary.unwrap();
        assert_eq!(summary.source, ForecastSource::SeasonalAi);
        assert!(summary.estimated);
        assert_eq!(entry.date_range, DateRange::from_start(start, 7));
        assert_eq!(entry.fallback_reason, Some(FallbackReason::BeyondHorizon));
    }

    #[tokio::test]
    async fn test_horizon_boundary() {
        let today = date(2026, 5, 1);
        let aggregator = aggregator_with(MockForecast::ok(), false);

        // last day at offset 13 is inside a 14-day horizon
        let inside = aggregator
            .aggregate_at("Shimla", Some(SHIMLA), date(2026, 5, 8), 7, today)
            .await;
        assert_eq!(inside.fallback_reason, None);

        // last day at offset 14 is not
        let outside = aggregator
            .aggregate_at("Shimla", Some(SHIMLA), date(2026, 5, 9), 7, today)
            .await;
        assert_eq!(outside.fallback_reason, Some(FallbackReason::BeyondHorizon));
    }

    #[tokio::test]
    async fn test_oversized_duration_does_not_panic() {
        let start = date(2026, 5, 3);
        let entry = aggregator_with(MockForecast::ok(), true)
            .aggregate_at("Shimla", Some(SHIMLA), start, u32::MAX, date(2026, 5, 1))
            .await;
        assert_eq!(entry.date_range.first_day(), start);
        assert_eq!(entry.date_range.end_date.date_naive(), NaiveDate::MAX);
        assert_eq!(entry.fallback_reason, Some(FallbackReason::BeyondHorizon));
        assert!(entry.forecast_summary.is_none());
    }

    #[tokio::test]
    async fn test_past_start_falls_back() {
        let entry = aggregator_with(MockForecast::ok(), false)
            .aggregate_at("Shimla", Some(SHIMLA), date(2026, 4, 1), 3, date(2026, 5, 1))
            .await;
        assert_eq!(entry.fallback_reason, Some(FallbackReason::PastDate));
        assert!(entry.forecast_summary.unwrap().estimated);
    }

    #[tokio::test]
    async fn test_provider_error_and_empty_forecast_fall_back() {
        let today = date(2026, 5, 1);
        let failing = MockForecast {
            fail: true,
            ..MockForecast::ok()
        };
        let entry = aggregator_with(failing, false)
            .aggregate_at("Shimla", Some(SHIMLA), date(2026, 5, 2), 3, today)
            .await;
        assert_eq!(entry.fallback_reason, Some(FallbackReason::ProviderError));
        assert_eq!(
            entry.forecast_summary.unwrap().source,
            ForecastSource::SeasonalAi
        );

        let empty = MockForecast {
            empty: true,
            ..MockForecast::ok()
        };
        let entry = aggregator_with(empty, false)
            .aggregate_at("Shimla", Some(SHIMLA), date(2026, 5, 2), 3, today)
            .await;
        assert_eq!(entry.fallback_reason, Some(FallbackReason::EmptyForecast));
    }

    #[tokio::test]
    async fn test_both_paths_failing_leaves_summary_empty() {
        let failing = MockForecast {
            fail: true,
            ..MockForecast::ok()
        };
        let entry = aggregator_with(failing, true)
            .aggregate_at("Shimla", Some(SHIMLA), date(2026, 5, 2), 3, date(2026, 5, 1))
            .await;
        assert!(entry.forecast_summary.is_none());
        assert_eq!(entry.date_range, DateRange::from_start(date(2026, 5, 2), 3));
    }

    #[tokio::test]
    async fn test_missing_coordinates_skip_providers() {
        let forecast = Arc::new(MockForecast::ok());
        let aggregator = WeatherAggregator::new(
            Arc::new(MockGeocoder),
            forecast.clone(),
            Arc::new(MockSeasonal { fail: false }),
            &WeatherConfig::default(),
        );
        let entry = aggregator
            .aggregate_at("Atlantis", None, date(2026, 5, 2), 3, date(2026, 5, 1))
            .await;
        assert!(entry.forecast_summary.is_none());
        assert_eq!(entry.date_range.num_days(), 3);
        assert_eq!(forecast.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_batch_isolates_geocode_failures_and_keeps_order() {
        let destinations: Vec<String> = ["Shimla", "Atlantis", "Broken", "Manali", "Slow"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let start = date(2026, 5, 3);
        let entries = aggregator_with(MockForecast::ok(), false)
            .aggregate_all_at(&destinations, start, 4, date(2026, 5, 1))
            .await;

        let names: Vec<&str> = entries.iter().map(|e| e.destination.as_str()).collect();
        assert_eq!(names, vec!["Shimla", "Atlantis", "Broken", "Manali", "Slow"]);

        for entry in &entries {
            assert_eq!(entry.date_range, DateRange::from_start(start, 4));
        }
        assert!(entries[0].forecast_summary.is_some());
        assert!(entries[1].forecast_summary.is_none());
        assert!(entries[2].forecast_summary.is_none());
        assert!(entries[3].forecast_summary.is_some());
        // geocoder timed out
        assert!(entries[4].forecast_summary.is_none());
        assert!(entries[4].coordinates.is_none());
    }
}

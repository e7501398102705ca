//! Generation Coordinator
//!
//! One pass per model response:
//!
//! 1. Validate the request
//! 2. Parse the raw text (tiered)
//! 3. Require a JSON object at the root
//! 4. Normalize cost fields in place
//! 5. Attach weather references when the request asks for them
//!
//! The coordinator holds no per-request state; one instance can serve
//! concurrent requests.

use std::time::Instant;

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use super::walker::CostWalker;
use crate::ai::validation::ResponseParser;
use crate::config::Config;
use crate::itinerary::CostFieldMatcher;
use crate::types::{
    AiCallLogEntry, CallStatus, GenerationError, GenerationRequest, ParsedItinerary,
    RawModelResponse, WeatherStatus,
};
use crate::weather::WeatherAggregator;

/// Result of `process_logged`: the outcome plus its audit record
#[derive(Debug)]
pub struct GenerationOutcome {
    pub result: Result<ParsedItinerary, GenerationError>,
    pub log: AiCallLogEntry,
}

pub struct GenerationCoordinator {
    parser: ResponseParser,
    walker: CostWalker,
    weather: Option<WeatherAggregator>,
}

impl GenerationCoordinator {
    pub fn new(parser: ResponseParser, matcher: CostFieldMatcher) -> Self {
        Self {
            parser,
            walker: CostWalker::new(matcher),
            weather: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ResponseParser::new(config.parser.clone()),
            CostFieldMatcher::new(&config.cost),
        )
    }

    pub fn with_weather(mut self, aggregator: WeatherAggregator) -> Self {
        self.weather = Some(aggregator);
        self
    }

    pub async fn process(
        &self,
        request: &GenerationRequest,
        raw: &RawModelResponse,
    ) -> Result<ParsedItinerary, GenerationError> {
        request.validate()?;

        let outcome = self.parser.parse(&raw.text)?;

        let mut content = outcome.value;
        if !content.is_object() {
            return Err(GenerationError::UnexpectedShape {
                found: json_kind(&content).to_string(),
            });
        }

        let normalized_cost_fields = self.walker.normalize(&mut content);

        let (weather, weather_status) = match (&self.weather, request.include_weather_reference) {
            (_, false) => (None, WeatherStatus::NotRequested),
            (Some(aggregator), true) => {
                let entries = aggregator
                    .aggregate_all(
                        &request.destinations,
                        request.start_date,
                        request.duration_days,
                    )
                    .await;
                (Some(entries), WeatherStatus::Attached)
            }
            (None, true) => {
                warn!("Weather reference requested but no aggregator is configured");
                (None, WeatherStatus::NotConfigured)
            }
        };

        info!(
            tier = %outcome.tier,
            was_repaired = outcome.was_repaired,
            normalized_cost_fields,
            weather_entries = weather.as_ref().map_or(0, Vec::len),
            "Itinerary processed"
        );

        Ok(ParsedItinerary {
            content,
            was_repaired: outcome.was_repaired,
            parse_tier: outcome.tier,
            weather,
            weather_status,
            normalized_cost_fields,
        })
    }

    /// `process`, plus an audit entry for success and failure alike
    pub async fn process_logged(
        &self,
        request: &GenerationRequest,
        raw: &RawModelResponse,
    ) -> GenerationOutcome {
        let started = Instant::now();
        let result = self.process(request, raw).await;
        let processing_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let mut log = AiCallLogEntry {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            model_name: raw.model_name.clone(),
            raw_text: raw.text.clone(),
            parsed: None,
            was_repaired: false,
            parse_tier: None,
            status: CallStatus::Success,
            error_kind: None,
            error_message: None,
            token_usage: raw.token_usage,
            response_time_ms: raw.response_time_ms,
            processing_ms,
        };

        match &result {
            Ok(itinerary) => {
                log.parsed = Some(itinerary.to_document());
                log.was_repaired = itinerary.was_repaired;
                log.parse_tier = Some(itinerary.parse_tier);
            }
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Generation attempt failed");
                log.status = CallStatus::Failed;
                log.error_kind = Some(e.kind().to_string());
                log.error_message = Some(e.to_string());
            }
        }

        GenerationOutcome { result, log }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeatherConfig;
    use crate::types::{Coordinates, DateRange, ForecastSource, GuardError, ParseTier, TokenUsage};
    use crate::weather::{DailyWeather, ForecastProvider, Geocoder, SeasonalEstimator};
    use async_trait::async_trait;
    use chrono::Duration;
    use serde_json::json;
    use std::sync::Arc;

    struct FixedGeocoder;

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn resolve(&self, destination: &str) -> crate::types::Result<Option<Coordinates>> {
            Ok((destination != "Nowhere").then(|| Coordinates::new(31.1, 77.17)))
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct SunnyForecast;

    fn sunny(range: &DateRange) -> Vec<DailyWeather> {
        (0..range.num_days())
            .map(|i| DailyWeather {
                date: range.first_day() + Duration::days(i),
                temp_min: 14.0,
                temp_max: 24.0,
                precipitation: 0.0,
                condition: "Clear sky".to_string(),
            })
            .collect()
    }

    #[async_trait]
    impl ForecastProvider for SunnyForecast {
        async fn daily_forecast(
            &self,
            _coordinates: Coordinates,
            range: &DateRange,
        ) -> crate::types::Result<Vec<DailyWeather>> {
            Ok(sunny(range))
        }

        fn horizon_days(&self) -> u32 {
            14
        }

        fn name(&self) -> &str {
            "sunny"
        }
    }

    struct DownEstimator;

    #[async_trait]
    impl SeasonalEstimator for DownEstimator {
        async fn estimate(
            &self,
            _coordinates: Coordinates,
            _range: &DateRange,
            _month: u32,
        ) -> crate::types::Result<Vec<DailyWeather>> {
            Err(GuardError::provider("down", "offline"))
        }

        fn name(&self) -> &str {
            "down"
        }
    }

    fn coordinator() -> GenerationCoordinator {
        let aggregator = WeatherAggregator::new(
            Arc::new(FixedGeocoder),
            Arc::new(SunnyForecast),
            Arc::new(DownEstimator),
            &WeatherConfig::default(),
        );
        GenerationCoordinator::from_config(&Config::default()).with_weather(aggregator)
    }

    fn request(destinations: &[&str]) -> GenerationRequest {
        // tomorrow keeps the trip inside the live forecast horizon
        let start = Utc::now().date_naive() + Duration::days(1);
        GenerationRequest::new(
            "Delhi",
            destinations.iter().map(|d| d.to_string()).collect(),
            start,
            3,
        )
    }

    fn response(text: &str) -> RawModelResponse {
        RawModelResponse {
            text: text.to_string(),
            model_name: "itinerary-model".to_string(),
            token_usage: TokenUsage {
                input_tokens: 900,
                output_tokens: 2100,
            },
            response_time_ms: 4200,
        }
    }

    #[tokio::test]
    async fn test_process_strict_with_cost_walk() {
        let raw = response(
            r#"{"title": "Hills", "totalEstimatedCost": "₹ 800 + ₹ 6,000 = ₹ 6,800", "currency": "INR"}"#,
        );
        let itinerary = coordinator()
            .process(&request(&["Shimla"]), &raw)
            .await
            .unwrap();

        assert_eq!(itinerary.parse_tier, ParseTier::Strict);
        assert!(!itinerary.was_repaired);
        assert_eq!(itinerary.content["totalEstimatedCost"], json!(6800));
        assert_eq!(itinerary.content["currency"], json!("INR"));
        assert_eq!(itinerary.normalized_cost_fields, 1);
        assert!(itinerary.weather.is_none());
        assert_eq!(itinerary.weather_status, WeatherStatus::NotRequested);
    }

    #[tokio::test]
    async fn test_process_attaches_weather_in_destination_order() {
        let req = request(&["Shimla", "Nowhere"]).with_weather(true);
        let raw = response(r#"Here you go: {"title": "Hills", "dayPlans": []} Enjoy!"#);
        let itinerary = coordinator().process(&req, &raw).await.unwrap();

        assert_eq!(itinerary.parse_tier, ParseTier::Substring);
        assert!(itinerary.was_repaired);

        assert_eq!(itinerary.weather_status, WeatherStatus::Attached);
        let weather = itinerary.weather.as_ref().unwrap();
        assert_eq!(weather.len(), 2);
        assert_eq!(weather[0].destination, "Shimla");
        let summary = weather[0].forecast_summary.as_ref().unwrap();
        assert_eq!(summary.source, ForecastSource::Forecast);
        assert!(weather[1].forecast_summary.is_none());
        assert_eq!(
            weather[1].date_range,
            DateRange::from_start(req.start_date, 3)
        );

        let doc = itinerary.to_document();
        assert_eq!(doc["weatherReference"][0]["forecastSummary"]["source"], json!("forecast"));
        assert_eq!(doc["weatherReference"][1]["forecastSummary"], json!(null));
    }

    #[tokio::test]
    async fn test_process_unparseable_is_typed() {
        let err = coordinator()
            .process(&request(&["Shimla"]), &response("Sorry, I cannot do that."))
            .await
            .unwrap_err();
        match err {
            GenerationError::Unparseable(parse) => {
                assert_eq!(parse.text_len, 24);
                assert_eq!(parse.tiers_tried.first(), Some(&ParseTier::Strict));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_process_rejects_non_object_root() {
        let err = coordinator()
            .process(&request(&["Shimla"]), &response("[1, 2, 3]"))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::UnexpectedShape { ref found } if found == "an array"));
    }

    #[tokio::test]
    async fn test_process_rejects_invalid_request_before_parsing() {
        let err = coordinator()
            .process(&request(&[]), &response(r#"{"title": "x"}"#))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_request");
    }

    #[tokio::test]
    async fn test_process_without_aggregator_skips_weather() {
        let coordinator = GenerationCoordinator::from_config(&Config::default());
        let req = request(&["Shimla"]).with_weather(true);
        let itinerary = coordinator
            .process(&req, &response(r#"{"title": "x"}"#))
            .await
            .unwrap();
        assert!(itinerary.weather.is_none());
        assert_eq!(itinerary.weather_status, WeatherStatus::NotConfigured);
    }

    #[tokio::test]
    async fn test_process_logged_success_and_failure() {
        let coordinator = coordinator();

        let ok = coordinator
            .process_logged(&request(&["Shimla"]), &response("{fare: '₹ 1,200',}"))
            .await;
        assert!(ok.result.is_ok());
        assert_eq!(ok.log.status, CallStatus::Success);
        assert_eq!(ok.log.parse_tier, Some(ParseTier::Lenient));
        assert!(ok.log.was_repaired);
        assert_eq!(ok.log.parsed, Some(json!({"fare": 1200})));
        assert_eq!(ok.log.model_name, "itinerary-model");
        assert_eq!(ok.log.token_usage.total(), 3000);
        assert_eq!(ok.log.response_time_ms, 4200);

        let failed = coordinator
            .process_logged(&request(&["Shimla"]), &response("nothing useful"))
            .await;
        assert!(failed.result.is_err());
        assert_eq!(failed.log.status, CallStatus::Failed);
        assert_eq!(failed.log.error_kind.as_deref(), Some("unparseable"));
        assert!(failed.log.parsed.is_none());
        assert_eq!(failed.log.raw_text, "nothing useful");

        let serialized = serde_json::to_value(&failed.log).unwrap();
        assert_eq!(serialized["status"], json!("failed"));
        assert!(serialized.get("parsed").is_none());
    }
}

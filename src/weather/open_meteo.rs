//! Open-Meteo adapters
//!
//! Key-less geocoding and daily forecast clients. Response structures mirror
//! the JSON the API returns; conversion into domain types happens at the edge.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{DailyWeather, ForecastProvider, Geocoder};
use crate::config::WeatherConfig;
use crate::types::{Coordinates, DateRange, GuardError, Result};

const PROVIDER: &str = "open-meteo";
const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,precipitation_sum,weathercode";

// =============================================================================
// Shared HTTP plumbing
// =============================================================================

pub(crate) fn build_client(config: &WeatherConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.request_timeout())
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(GuardError::from)
}

/// GET `url` with `query` and decode a JSON body, surfacing non-2xx as provider errors
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    query: &[(&str, String)],
    provider: &str,
) -> Result<T> {
    let res = client.get(url).query(query).send().await?;

    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        return Err(GuardError::provider(
            provider,
            format!("request failed with status {}: {}", status, truncate_body(&body)),
        ));
    }

    serde_json::from_str(&body).map_err(|e| {
        GuardError::provider(
            provider,
            format!("unexpected response body ({}): {}", e, truncate_body(&body)),
        )
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

// =============================================================================
// Response structures
// =============================================================================

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DailyResponse {
    pub daily: Option<DailyData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DailyData {
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m_max", default)]
    pub temperature_max: Vec<Option<f64>>,
    #[serde(rename = "temperature_2m_min", default)]
    pub temperature_min: Vec<Option<f64>>,
    #[serde(rename = "precipitation_sum", default)]
    pub precipitation: Vec<Option<f64>>,
    #[serde(rename = "weathercode", default)]
    pub weather_code: Vec<Option<u8>>,
}

impl DailyData {
    /// Days missing a temperature are skipped; missing rain counts as 0 mm
    pub fn into_days(self) -> Vec<DailyWeather> {
        self.time
            .iter()
            .enumerate()
            .filter_map(|(i, time)| {
                let date = NaiveDate::parse_from_str(time, "%Y-%m-%d").ok()?;
                let temp_max = self.temperature_max.get(i).copied().flatten()?;
                let temp_min = self.temperature_min.get(i).copied().flatten()?;
                let precipitation = self.precipitation.get(i).copied().flatten().unwrap_or(0.0);
                let condition = self
                    .weather_code
                    .get(i)
                    .copied()
                    .flatten()
                    .map(weather_code_to_description)
                    .unwrap_or("Unknown")
                    .to_string();
                Some(DailyWeather {
                    date,
                    temp_min,
                    temp_max,
                    precipitation,
                    condition,
                })
            })
            .collect()
    }
}

/// Convert a WMO weather code to a human-readable description
#[must_use]
pub fn weather_code_to_description(code: u8) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

// =============================================================================
// Geocoder
// =============================================================================

pub struct OpenMeteoGeocoder {
    client: Client,
    base_url: String,
}

impl OpenMeteoGeocoder {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            base_url: config.geocoding_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Geocoder for OpenMeteoGeocoder {
    async fn resolve(&self, destination: &str) -> Result<Option<Coordinates>> {
        let url = format!("{}/search", self.base_url);
        let query = [
            ("name", destination.trim().to_string()),
            ("count", "1".to_string()),
            ("language", "en".to_string()),
            ("format", "json".to_string()),
        ];
        let response: GeocodingResponse = fetch_json(&self.client, &url, &query, PROVIDER).await?;

        let best = response.results.unwrap_or_default().into_iter().next();
        if let Some(hit) = &best {
            debug!(
                destination,
                matched = %hit.name,
                country = hit.country.as_deref().unwrap_or("Unknown"),
                "Geocoded destination"
            );
        }
        Ok(best.map(|hit| Coordinates::new(hit.latitude, hit.longitude)))
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

// =============================================================================
// Forecast
// =============================================================================

pub struct OpenMeteoForecast {
    client: Client,
    base_url: String,
    horizon_days: u32,
}

impl OpenMeteoForecast {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            base_url: config.forecast_base_url.trim_end_matches('/').to_string(),
            horizon_days: config.horizon_days,
        })
    }
}

/// Query shared by the forecast and archive endpoints
pub(crate) fn daily_query(
    coordinates: Coordinates,
    first_day: NaiveDate,
    last_day: NaiveDate,
) -> Vec<(&'static str, String)> {
    vec![
        ("latitude", coordinates.latitude.to_string()),
        ("longitude", coordinates.longitude.to_string()),
        ("daily", DAILY_FIELDS.to_string()),
        ("start_date", first_day.format("%Y-%m-%d").to_string()),
        ("end_date", last_day.format("%Y-%m-%d").to_string()),
        ("timezone", "UTC".to_string()),
    ]
}

#[async_trait]
impl ForecastProvider for OpenMeteoForecast {
    async fn daily_forecast(
        &self,
        coordinates: Coordinates,
        range: &DateRange,
    ) -> Result<Vec<DailyWeather>> {
        let url = format!("{}/forecast", self.base_url);
        let query = daily_query(coordinates, range.first_day(), range.last_day());
        let response: DailyResponse = fetch_json(&self.client, &url, &query, PROVIDER).await?;

        Ok(response.daily.map(DailyData::into_days).unwrap_or_default())
    }

    fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

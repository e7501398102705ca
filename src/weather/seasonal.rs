//! Climatological fallback backed by the Open-Meteo historical archive.
//!
//! The estimate for a trip is the observed weather over the same calendar
//! window in the most recent year the archive has published, re-dated onto
//! the trip's days. Trips more than a year out step back as many whole years
//! as needed.

use async_trait::async_trait;
use chrono::{Datelike, Days, Months, NaiveDate, Utc};
use reqwest::Client;
use tracing::debug;

use super::open_meteo::{DailyData, DailyResponse, build_client, daily_query, fetch_json};
use super::{DailyWeather, SeasonalEstimator};
use crate::config::WeatherConfig;
use crate::constants::{request::MAX_DURATION_DAYS, weather::ARCHIVE_LAG_DAYS};
use crate::types::{Coordinates, DateRange, GuardError, Result};

const PROVIDER: &str = "open-meteo-archive";

pub struct ArchiveSeasonalEstimator {
    client: Client,
    base_url: String,
}

impl ArchiveSeasonalEstimator {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            base_url: config.archive_base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Latest archived window matching the trip's calendar days.
///
/// The window starts in `month`; when that differs from the trip's own start
/// month it is anchored on the 1st of `month`. Feb 29 clamps to Feb 28.
fn reference_window(
    range: &DateRange,
    month: u32,
    today: NaiveDate,
) -> Option<(NaiveDate, NaiveDate)> {
    let trip_start = range.first_day();
    let anchor = if trip_start.month() == month {
        trip_start
    } else {
        NaiveDate::from_ymd_opt(trip_start.year(), month, 1)?
    };
    let span = Days::new(u64::try_from(range.num_days().max(1) - 1).ok()?);
    let published = today.checked_sub_days(Days::new(ARCHIVE_LAG_DAYS))?;

    let anchor_end = anchor.checked_add_days(span)?;
    let mut years = u32::try_from((anchor_end.year() - published.year()).max(1)).ok()?;
    loop {
        let start = anchor.checked_sub_months(Months::new(years.checked_mul(12)?))?;
        let end = start.checked_add_days(span)?;
        if end <= published {
            return Some((start, end));
        }
        years += 1;
    }
}

/// Move historical days onto the trip's calendar by position
fn redate(days: Vec<DailyWeather>, reference_start: NaiveDate, range: &DateRange) -> Vec<DailyWeather> {
    days.into_iter()
        .filter_map(|mut day| {
            let offset = (day.date - reference_start).num_days();
            let date = range
                .first_day()
                .checked_add_signed(chrono::Duration::days(offset))?;
            range.contains_day(date).then(|| {
                day.date = date;
                day
            })
        })
        .collect()
}

#[async_trait]
impl SeasonalEstimator for ArchiveSeasonalEstimator {
    async fn estimate(
        &self,
        coordinates: Coordinates,
        range: &DateRange,
        month: u32,
    ) -> Result<Vec<DailyWeather>> {
        if range.num_days() > i64::from(MAX_DURATION_DAYS) {
            return Err(GuardError::provider(
                PROVIDER,
                format!(
                    "archive window of {} days exceeds {} days",
                    range.num_days(),
                    MAX_DURATION_DAYS
                ),
            ));
        }
        let (first, last) = reference_window(range, month, Utc::now().date_naive())
            .ok_or_else(|| GuardError::provider(PROVIDER, "date range outside supported calendar"))?;
        debug!(
            month,
            reference_start = %first,
            reference_end = %last,
            "Requesting archive window"
        );

        let url = format!("{}/archive", self.base_url);
        let query = daily_query(coordinates, first, last);
        let response: DailyResponse = fetch_json(&self.client, &url, &query, PROVIDER).await?;

        let days = response.daily.map(DailyData::into_days).unwrap_or_default();
        Ok(redate(days, first, range))
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

//! Weather Command
//!
//! Fetch the weather reference for destinations using Open-Meteo.
//!
//! Usage:
//!   itinerary-guard weather Shimla Manali --start 2026-05-01 --days 7

use chrono::NaiveDate;

use super::OutputFormat;
use crate::cli::ui::Output;
use crate::config::Config;
use crate::constants::request::{MAX_DESTINATIONS, MAX_DURATION_DAYS};
use crate::types::{GuardError, Result};
use crate::weather::WeatherAggregator;

pub async fn run(
    config: &Config,
    destinations: &[String],
    start: NaiveDate,
    days: u32,
    format: OutputFormat,
) -> Result<()> {
    validate_args(destinations, days)?;

    let aggregator = WeatherAggregator::open_meteo(&config.weather)?;
    let entries = aggregator.aggregate_all(destinations, start, days).await;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Text => {
            let output = Output::new();
            output.header("Weather Reference");
            for entry in &entries {
                output.forecast(entry);
                if let Some(reason) = entry.fallback_reason {
                    output.info(&format!("Live forecast not used: {}", reason));
                }
            }
        }
    }
    Ok(())
}

fn validate_args(destinations: &[String], days: u32) -> Result<()> {
    if destinations.is_empty() {
        return Err(GuardError::Validation(
            "at least one destination is required".to_string(),
        ));
    }
    if destinations.len() > MAX_DESTINATIONS {
        return Err(GuardError::Validation(format!(
            "at most {} destinations are allowed, got {}",
            MAX_DESTINATIONS,
            destinations.len()
        )));
    }
    if !(1..=MAX_DURATION_DAYS).contains(&days) {
        return Err(GuardError::Validation(format!(
            "--days must be between 1 and {}, got {}",
            MAX_DURATION_DAYS, days
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Town {}", i)).collect()
    }

    #[test]
    fn test_validate_args_bounds() {
        assert!(validate_args(&names(1), 1).is_ok());
        assert!(validate_args(&names(MAX_DESTINATIONS), MAX_DURATION_DAYS).is_ok());

        assert!(validate_args(&[], 7).is_err());
        assert!(validate_args(&names(MAX_DESTINATIONS + 1), 7).is_err());
        assert!(validate_args(&names(1), 0).is_err());
        assert!(validate_args(&names(1), MAX_DURATION_DAYS + 1).is_err());
        assert!(validate_args(&names(1), u32::MAX).is_err());
    }
}

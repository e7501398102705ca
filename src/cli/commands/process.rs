//! Process Command
//!
//! Run the full pipeline over a request and a saved model response.
//!
//! Usage:
//!   itinerary-guard process --request request.json --response response.txt [--log]

use std::path::Path;

use crate::cli::read_input;
use crate::cli::ui::Output;
use crate::config::Config;
use crate::itinerary::GenerationCoordinator;
use crate::types::{GenerationRequest, RawModelResponse, Result};
use crate::weather::WeatherAggregator;

pub async fn run(
    config: &Config,
    request_path: &Path,
    response_path: &Path,
    model_name: &str,
    show_log: bool,
) -> Result<()> {
    let request: GenerationRequest = serde_json::from_str(&read_input(request_path)?)?;
    let raw = RawModelResponse {
        model_name: model_name.to_string(),
        ..RawModelResponse::from_text(read_input(response_path)?)
    };

    let mut coordinator = GenerationCoordinator::from_config(config);
    if request.include_weather_reference {
        coordinator = coordinator.with_weather(WeatherAggregator::open_meteo(&config.weather)?);
    }

    let outcome = coordinator.process_logged(&request, &raw).await;
    let output = Output::new();

    if show_log {
        output.section("Audit log entry");
        println!("{}", serde_json::to_string_pretty(&outcome.log)?);
    }

    if let Err(e) = &outcome.result {
        output.error(&format!("Generation failed ({})", e.kind()));
        if e.should_reprompt() {
            output.info("The model can be re-prompted for this request");
        }
    }
    let itinerary = outcome.result?;
    output.tier(itinerary.parse_tier);
    output.info(&format!(
        "{} cost field(s) normalized",
        itinerary.normalized_cost_fields
    ));
    println!("{}", serde_json::to_string_pretty(&itinerary.to_document())?);
    Ok(())
}

//! Parse Command
//!
//! Run the tiered parser over a saved model response.
//!
//! Usage:
//!   itinerary-guard parse response.txt [-f json]
//!   cat response.txt | itinerary-guard parse -

use std::path::Path;

use super::OutputFormat;
use crate::ai::validation::ResponseParser;
use crate::cli::read_input;
use crate::cli::ui::Output;
use crate::config::Config;
use crate::types::Result;

pub fn run(config: &Config, input: &Path, format: OutputFormat) -> Result<()> {
    let text = read_input(input)?;
    let parser = ResponseParser::new(config.parser.clone());
    let outcome = parser.parse(&text)?;

    match format {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "tier": outcome.tier,
                "wasRepaired": outcome.was_repaired,
                "value": outcome.value,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            let output = Output::new();
            output.tier(outcome.tier);
            println!("{}", serde_json::to_string_pretty(&outcome.value)?);
        }
    }
    Ok(())
}

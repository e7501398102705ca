//! Cost Command
//!
//! Show how free-form cost strings normalize.
//!
//! Usage:
//!   itinerary-guard cost "₹ 800 + ₹ 6,000 = ₹ 6,800" "Free"

use super::OutputFormat;
use crate::itinerary::CostNormalizer;
use crate::types::Result;

pub fn run(values: &[String], format: OutputFormat) -> Result<()> {
    let rows: Vec<(&str, f64)> = values
        .iter()
        .map(|v| (v.as_str(), CostNormalizer::parse_str(v)))
        .collect();

    match format {
        OutputFormat::Json => {
            let report: Vec<serde_json::Value> = rows
                .iter()
                .map(|(input, amount)| {
                    serde_json::json!({
                        "input": input,
                        "amount": CostNormalizer::to_value(*amount),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            let width = rows.iter().map(|(i, _)| i.chars().count()).max().unwrap_or(0);
            for (input, amount) in rows {
                let pad = width.saturating_sub(input.chars().count());
                println!("{}{}  →  {}", input, " ".repeat(pad), amount);
            }
        }
    }
    Ok(())
}

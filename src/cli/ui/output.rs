use console::style;

use crate::types::{ForecastEntry, ParseTier};

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    pub fn field(&self, label: &str, value: impl std::fmt::Display) {
        println!("  {:<18} {}", style(label).dim(), value);
    }

    /// Tier line: green for strict, yellow for any repair
    pub fn tier(&self, tier: ParseTier) {
        if tier.is_repair() {
            self.warning(&format!("Parsed via {} (repaired)", tier));
        } else {
            self.success(&format!("Parsed via {}", tier));
        }
    }

    pub fn forecast(&self, entry: &ForecastEntry) {
        self.section(&entry.destination);
        self.field(
            "Dates",
            format!("{} → {}", entry.date_range.first_day(), entry.date_range.last_day()),
        );
        match &entry.coordinates {
            Some(c) => self.field("Coordinates", format!("{:.4}, {:.4}", c.latitude, c.longitude)),
            None => self.field("Coordinates", style("unresolved").red()),
        }

        let Some(summary) = &entry.forecast_summary else {
            self.warning("No weather data available");
            return;
        };

        let source = if summary.estimated {
            style(summary.source.as_str()).yellow()
        } else {
            style(summary.source.as_str()).green()
        };
        self.field("Source", source);
        self.field("Conditions", &summary.conditions);
        self.field(
            "Temperature",
            format!(
                "{:.1}°C to {:.1}°C (avg {:.1} / {:.1})",
                summary.min_temp, summary.max_temp, summary.avg_min_temp, summary.avg_max_temp
            ),
        );
        self.field("Precipitation", format!("{:.1} mm/day", summary.avg_precipitation));
        for rec in &summary.recommendations {
            println!("  • {}", rec);
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

//! Config Command
//!
//! Inspect itinerary-guard configuration.
//!
//! Usage:
//!   itinerary-guard config show [-f toml|json|yaml]
//!   itinerary-guard config path

use crate::config::{Config, ConfigLoader};
use crate::types::Result;

/// Show the effective configuration (merged from all sources)
pub fn show(config: &Config, format: &str) -> Result<()> {
    let rendered = ConfigLoader::render(config, format)?;
    if matches!(format, "text" | "toml") {
        println!("# Effective configuration\n");
    }
    println!("{}", rendered.trim_end());
    Ok(())
}

/// Show configuration file paths and whether they exist
pub fn path() -> Result<()> {
    let mark = |exists: bool| if exists { "✓" } else { "✗" };

    match ConfigLoader::global_config_path() {
        Some(global) => println!("Global:  {} {}", mark(global.exists()), global.display()),
        None => println!("Global:  (cannot determine config directory)"),
    }

    let project = ConfigLoader::project_config_path();
    println!("Project: {} {}", mark(project.exists()), project.display());
    println!("Env:     ITINERARY_GUARD_<SECTION>__<KEY>");
    Ok(())
}

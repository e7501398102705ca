//! CLI Common Utilities
//!
//! Shared config and input handling for command handlers.

use std::io::Read;
use std::path::Path;

use crate::config::{Config, ConfigLoader};
use crate::types::{GuardError, Result};

/// Load an explicit config file, or the full layered resolution chain
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            if !path.exists() {
                return Err(GuardError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            ConfigLoader::load_from_file(path)
        }
        None => ConfigLoader::load(),
    }
}

/// Read a file, or stdin when the path is `-`
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).map_err(|e| {
        GuardError::Validation(format!("Cannot read {}: {}", path.display(), e))
    })
}

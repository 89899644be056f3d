//! Shared loaders and the simple commands
//!
//! This module contains:
//! - `load_config` / `load_filters` / `build_matcher` - Shared by every command
//! - `cmd_clean` - Show cleaned merchant names
//! - `cmd_config_show` / `cmd_config_path` - Configuration inspection

use std::path::Path;

use anyhow::{Context, Result};
use triage_core::config::default_config_path;
use triage_core::input::load_noise_filters;
use triage_core::{EngineConfig, RuleMatcher};

/// Load the engine config from `--config`, the user override, or built-in defaults
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            EngineConfig::load_from(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => EngineConfig::load().context("Failed to load engine config"),
    }
}

/// Read a noise filter file, or none if no file was given
pub fn load_filters(path: Option<&Path>) -> Result<Vec<String>> {
    match path {
        Some(path) => load_noise_filters(path)
            .with_context(|| format!("Failed to read noise filters from {}", path.display())),
        None => Ok(Vec::new()),
    }
}

/// Rule matcher carrying config filters followed by the user's filter file
pub fn build_matcher(config: &EngineConfig, filters_path: Option<&Path>) -> Result<RuleMatcher> {
    let filters = load_filters(filters_path)?;
    Ok(RuleMatcher::with_config(config, &filters))
}

pub fn cmd_clean(
    config_path: Option<&Path>,
    filters_path: Option<&Path>,
    descriptions: &[String],
) -> Result<()> {
    let config = load_config(config_path)?;
    let matcher = build_matcher(&config, filters_path)?;

    for description in descriptions {
        let cleaned = matcher.clean(description);
        if cleaned.is_empty() {
            println!("{:40} -> (empty)", description);
        } else {
            println!("{:40} -> {}", description, cleaned);
        }
    }

    Ok(())
}

pub fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let json =
        serde_json::to_string_pretty(&config).context("Failed to serialize configuration")?;
    println!("{}", json);
    Ok(())
}

pub fn cmd_config_path() -> Result<()> {
    match default_config_path() {
        Some(path) => {
            let state = if path.exists() { "exists" } else { "not created" };
            println!("{} ({})", path.display(), state);
        }
        None => println!("No user data directory on this platform; using built-in defaults"),
    }
    Ok(())
}

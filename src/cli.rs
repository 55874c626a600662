//! Command-line interface parsing for npsites
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! the [`Settings`] the application starts with.

use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;

use crate::cache::{CacheStore, DEFAULT_CACHE_FILENAME};
use crate::data::nps::NPS_BASE_URL;
use crate::data::places::{DEFAULT_MAX_MATCHES, DEFAULT_RADIUS_MILES, PLACES_BASE_URL};

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// A numeric setting must be at least 1
    #[error("Invalid {name}: must be at least 1")]
    ZeroValue { name: &'static str },

    /// The API key was given but is blank
    #[error("Invalid API key: must not be empty")]
    EmptyApiKey,
}

/// npsites - Browse national park sites by state and find places nearby
#[derive(Parser, Debug)]
#[command(name = "npsites")]
#[command(about = "Browse national park sites by state and find places nearby")]
#[command(version)]
pub struct Cli {
    /// API key for the places search
    #[arg(long, env = "MAPQUEST_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Cache file location (default: ~/.cache/npsites/sites_mapping_cache.json)
    #[arg(long, value_name = "PATH")]
    pub cache_file: Option<PathBuf>,

    /// Search radius for nearby places, in miles
    #[arg(long, value_name = "MILES", default_value_t = DEFAULT_RADIUS_MILES)]
    pub radius: u32,

    /// Maximum number of nearby places to list
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_MATCHES)]
    pub max_matches: u32,

    /// Park service site root
    #[arg(long, hide = true, default_value = NPS_BASE_URL)]
    pub nps_base_url: String,

    /// Places search endpoint
    #[arg(long, hide = true, default_value = PLACES_BASE_URL)]
    pub places_url: String,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_key: String,
    pub cache_file: PathBuf,
    pub radius: u32,
    pub max_matches: u32,
    pub nps_base_url: String,
    pub places_url: String,
}

impl Settings {
    /// Creates Settings from parsed CLI arguments.
    ///
    /// The cache file defaults to the XDG cache directory, falling back to the
    /// current directory when no home directory is known.
    ///
    /// # Returns
    /// * `Ok(Settings)` with validated values
    /// * `Err(CliError)` if a value is out of range
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.api_key.trim().is_empty() {
            return Err(CliError::EmptyApiKey);
        }
        if cli.radius == 0 {
            return Err(CliError::ZeroValue { name: "radius" });
        }
        if cli.max_matches == 0 {
            return Err(CliError::ZeroValue {
                name: "max-matches",
            });
        }

        let cache_file = cli
            .cache_file
            .clone()
            .or_else(CacheStore::default_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_FILENAME));

        Ok(Settings {
            api_key: cli.api_key.trim().to_string(),
            cache_file,
            radius: cli.radius,
            max_matches: cli.max_matches,
            nps_base_url: cli.nps_base_url.clone(),
            places_url: cli.places_url.clone(),
        })
    }
}

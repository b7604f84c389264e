use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::fetch::DEFAULT_SOURCE_URL;
use crate::sync::DEFAULT_CLOSED_MARKER;

const CONFIG_FILE: &str = "internships";
const ENV_PREFIX: &str = "INTERNSHIPS";

/// Runtime settings: `internships.toml` (optional), then `INTERNSHIPS_*`
/// environment variables. CLI flags are applied on top by the caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source_url: String,
    pub db_path: PathBuf,
    pub closed_marker: String,
    pub timeout_secs: u64,
    /// Year assumed for listing dates. Current local year when unset.
    pub reference_year: Option<i32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            db_path: PathBuf::from("data/internships.sqlite"),
            closed_marker: DEFAULT_CLOSED_MARKER.to_string(),
            timeout_secs: 30,
            reference_year: None,
        }
    }
}

pub fn load() -> Result<Settings, ConfigError> {
    Config::builder()
        .add_source(File::with_name(CONFIG_FILE).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()?
        .try_deserialize()
}

//! Settings of the `jobqueue-staging` binary
//!
//! Settings are layered, highest priority last:
//! 1. Default values (embedded in structs)
//! 2. TOML file, `config/jobqueue-staging.toml` or the path in `JOBQUEUE_STAGING_CONFIG`
//! 3. `.env` file
//! 4. Environment variables `JOBQUEUE_STAGING__<section>__<key>`
//!
//! Examples:
//! - `JOBQUEUE_STAGING__DATA_DIR=/data`
//! - `JOBQUEUE_STAGING__CLIENT__BACKOFF_MAX_TRIES=3`
//!
//! The Storage API token is read from `STORAGE_API_TOKEN` only.
//!
//! ```no_run
//! use jobqueue_staging::settings::Settings;
//!
//! let settings = Settings::load().expect("Failed to load settings");
//! println!("Staging data in: {}", settings.data_dir.display());
//! ```

mod models;
mod sources;
mod validation;

pub use models::{ClientSettings, Settings};
pub use validation::SettingsValidationError;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Settings validation failed: {0}")]
    ValidationError(#[from] SettingsValidationError),
}

impl Settings {
    /// Load settings from all sources (file + environment)
    pub fn load() -> Result<Self, SettingsError> {
        let settings = sources::load()?;
        validation::validate(&settings)?;
        Ok(settings)
    }

    /// Load settings from a specific file, environment overrides still apply
    pub fn load_from_path(path: PathBuf) -> Result<Self, SettingsError> {
        let settings = sources::load_from_sources(path)?;
        validation::validate(&settings)?;
        Ok(settings)
    }
}

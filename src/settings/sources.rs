use super::models::Settings;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const SETTINGS_ENV_VAR: &str = "JOBQUEUE_STAGING_CONFIG";
const DEFAULT_SETTINGS_PATH: &str = "config/jobqueue-staging.toml";
const ENV_PREFIX: &str = "JOBQUEUE_STAGING";
const ENV_SEPARATOR: &str = "__";
const TOKEN_ENV_VAR: &str = "STORAGE_API_TOKEN";

/// Load settings from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Settings, ConfigError> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    let path = env::var(SETTINGS_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_SETTINGS_PATH));

    let mut settings = load_from_sources(path)?;
    load_secrets(&mut settings);
    Ok(settings)
}

/// The Storage API token never comes from a settings file
fn load_secrets(settings: &mut Settings) {
    if let Ok(token) = env::var(TOKEN_ENV_VAR) {
        if !token.is_empty() {
            settings.client.token = Some(token);
        }
    }
}

/// Load settings from a specific path and the environment
pub fn load_from_sources(path: PathBuf) -> Result<Settings, ConfigError> {
    let mut builder = config::Config::builder();

    if path.exists() {
        tracing::info!(path = %path.display(), "Loading settings");
        builder = builder.add_source(File::from(path).required(false));
    } else {
        tracing::debug!(
            path = %path.display(),
            "Settings file not found, using defaults and environment overrides"
        );
    }

    // JOBQUEUE_STAGING__CLIENT__BACKOFF_MAX_TRIES -> client.backoff_max_tries
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}

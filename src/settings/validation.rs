use super::models::Settings;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsValidationError {
    #[error("client.backoff_max_tries must be positive")]
    InvalidBackoffMaxTries,

    #[error("client.user_agent must not be empty")]
    EmptyUserAgent,

    #[error("data_dir must not be empty")]
    EmptyDataDir,

    #[error("Invalid client.url '{url}', expected an http:// or https:// URL")]
    InvalidUrl { url: String },
}

/// Validate the loaded settings
pub fn validate(settings: &Settings) -> Result<(), SettingsValidationError> {
    if settings.data_dir.as_os_str().is_empty() {
        return Err(SettingsValidationError::EmptyDataDir);
    }
    validate_client(settings)
}

fn validate_client(settings: &Settings) -> Result<(), SettingsValidationError> {
    let client = &settings.client;

    if client.backoff_max_tries == 0 {
        return Err(SettingsValidationError::InvalidBackoffMaxTries);
    }

    if client.user_agent.trim().is_empty() {
        return Err(SettingsValidationError::EmptyUserAgent);
    }

    if let Some(url) = &client.url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SettingsValidationError::InvalidUrl { url: url.clone() });
        }
    }

    Ok(())
}

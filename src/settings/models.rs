use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::client::{DEFAULT_BACKOFF_MAX_TRIES, DEFAULT_USER_AGENT, JobStorageApiClientOptions};

/// Top-level settings of the binary
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Root of the job's staging directories
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub client: ClientSettings,
}

/// Storage API client settings
#[derive(Clone, Deserialize, Serialize)]
pub struct ClientSettings {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_backoff_max_tries")]
    pub backoff_max_tries: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Read from `STORAGE_API_TOKEN` only, never from files
    #[serde(skip)]
    pub token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            client: ClientSettings::default(),
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            url: None,
            backoff_max_tries: default_backoff_max_tries(),
            user_agent: default_user_agent(),
            token: None,
        }
    }
}

impl std::fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSettings")
            .field("url", &self.url)
            .field("backoff_max_tries", &self.backoff_max_tries)
            .field("user_agent", &self.user_agent)
            .field("token", &self.token.as_ref().map(|_| "****"))
            .finish()
    }
}

impl ClientSettings {
    /// Client options for one job run.
    pub fn job_options(&self, run_id: Option<String>, branch_id: Option<String>) -> JobStorageApiClientOptions {
        JobStorageApiClientOptions::builder()
            .maybe_run_id(run_id)
            .maybe_branch_id(branch_id)
            .backoff_max_tries(self.backoff_max_tries)
            .base_user_agent(self.user_agent.clone())
            .build()
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_backoff_max_tries() -> u32 {
    DEFAULT_BACKOFF_MAX_TRIES
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

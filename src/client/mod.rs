//! Per-job Storage API connection parameters and session facts.

use bon::Builder;
use std::collections::BTreeSet;
use std::time::Duration;

pub const DEFAULT_BACKOFF_MAX_TRIES: u32 = 10;
pub const DEFAULT_USER_AGENT: &str = "jobqueue-staging";

/// Project feature that enables native data types on table upload.
pub const NEW_NATIVE_TYPES_FEATURE: &str = "new-native-types";

/// Options binding one job to a Storage API client.
///
/// ```
/// use jobqueue_staging::client::JobStorageApiClientOptions;
///
/// let options = JobStorageApiClientOptions::builder()
///     .run_id("1234")
///     .branch_id("567")
///     .build();
/// assert_eq!(options.backoff_max_tries, 10);
/// assert_eq!(options.user_agent(), "jobqueue-staging (run: 1234)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct JobStorageApiClientOptions {
    #[builder(into)]
    pub run_id: Option<String>,
    #[builder(into)]
    pub branch_id: Option<String>,
    #[builder(default)]
    pub use_branch_storage: bool,
    #[builder(default = DEFAULT_BACKOFF_MAX_TRIES)]
    pub backoff_max_tries: u32,
    #[builder(into)]
    pub backend_size: Option<String>,
    #[builder(into)]
    pub backend_context: Option<String>,
    #[builder(into, default = DEFAULT_USER_AGENT.to_string())]
    pub base_user_agent: String,
}

impl JobStorageApiClientOptions {
    /// Delay before retry number `tries` of a failed Storage API call.
    pub fn retry_delay(tries: u32) -> Duration {
        match tries {
            0..15 => Duration::from_secs(1),
            15..30 => Duration::from_secs(2),
            _ => Duration::from_secs(5),
        }
    }

    pub fn user_agent(&self) -> String {
        match &self.run_id {
            Some(run_id) => format!("{} (run: {run_id})", self.base_user_agent),
            None => self.base_user_agent.clone(),
        }
    }

    /// Same connection, different backend; used when a job asks for a
    /// non-default workspace size.
    pub fn with_backend(&self, size: Option<String>, context: Option<String>) -> Self {
        Self {
            backend_size: size,
            backend_context: context,
            ..self.clone()
        }
    }
}

/// Facts about the token/branch the job's client is connected to.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct StorageSession {
    #[builder(default)]
    pub project_features: BTreeSet<String>,
    #[builder(into)]
    pub branch_id: Option<String>,
    #[builder(default = true)]
    pub is_default_branch: bool,
}

impl StorageSession {
    pub fn has_project_feature(&self, feature: &str) -> bool {
        self.project_features.contains(feature)
    }

    pub fn has_new_native_types(&self) -> bool {
        self.has_project_feature(NEW_NATIVE_TYPES_FEATURE)
    }

    /// Branch id only when the job runs in a development branch.
    pub fn dev_branch_id(&self) -> Option<&str> {
        if self.is_default_branch {
            return None;
        }
        self.branch_id.as_deref()
    }
}

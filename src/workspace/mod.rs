//! Storage workspaces backing workspace-type staging.
//!
//! A job stages data either on the local filesystem or in a workspace: a
//! database schema or blob container provisioned by the Storage API. The
//! [`WorkspaceProviderFactory`] decides per staging type whether the job
//! gets a fresh workspace, reuses a persistent one or uses externally
//! supplied credentials. The [`WorkspaceCleaner`] removes what the job
//! created once it is done.

mod cleaner;
mod factory;
mod provider;

pub use cleaner::WorkspaceCleaner;
pub use factory::WorkspaceProviderFactory;
pub use provider::{ExistingWorkspace, NewWorkspace, WorkspaceProvider};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct WorkspaceApiError {
    pub status: Option<u16>,
    pub message: String,
}

impl WorkspaceApiError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

pub type Result<T> = std::result::Result<T, WorkspaceApiError>;

/// A provisioned workspace and its connection credentials.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub backend: String,
    #[serde(default)]
    pub credentials: Map<String, Value>,
}

impl Workspace {
    /// Numeric id used to order persistent workspaces; ids that are not
    /// numbers sort last.
    pub fn numeric_id(&self) -> u64 {
        self.id.parse().unwrap_or(u64::MAX)
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("id", &self.id)
            .field("backend", &self.backend)
            .field("credentials", &self.credentials.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoginType {
    Password,
    SnowflakeKeyPair,
}

/// Parameters of a workspace creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateWorkspace {
    pub component_id: String,
    /// Set for persistent workspaces bound to a configuration.
    pub config_id: Option<String>,
    pub backend: String,
    pub backend_size: Option<String>,
    pub read_only_storage_access: bool,
    pub login_type: LoginType,
}

/// Storage API workspace endpoints.
#[async_trait]
pub trait WorkspaceApi: Send + Sync {
    /// Workspaces bound to a component configuration.
    async fn list_workspaces(&self, component_id: &str, config_id: &str) -> Result<Vec<Workspace>>;

    async fn create_workspace(&self, request: &CreateWorkspace) -> Result<Workspace>;

    /// Issue new credentials for an existing workspace.
    async fn reset_credentials(&self, workspace: &Workspace) -> Result<Workspace>;

    async fn delete_workspace(&self, workspace_id: &str) -> Result<()>;
}

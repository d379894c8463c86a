use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::error::{JobError, Result};
use crate::specification::StagingType;

use super::{CreateWorkspace, Workspace, WorkspaceApi, WorkspaceApiError};

/// Workspace created for this job only; created on first use and
/// deleted by the cleaner.
pub struct NewWorkspace {
    api: Arc<dyn WorkspaceApi>,
    request: CreateWorkspace,
    workspace: OnceCell<Workspace>,
}

impl NewWorkspace {
    pub fn new(api: Arc<dyn WorkspaceApi>, request: CreateWorkspace) -> Self {
        Self {
            api,
            request,
            workspace: OnceCell::new(),
        }
    }

    pub fn request(&self) -> &CreateWorkspace {
        &self.request
    }

    pub fn is_created(&self) -> bool {
        self.workspace.initialized()
    }

    async fn workspace(&self) -> Result<&Workspace> {
        self.workspace
            .get_or_try_init(|| async {
                let workspace = self.api.create_workspace(&self.request).await?;
                tracing::info!(
                    workspace_id = %workspace.id,
                    backend = %workspace.backend,
                    read_only = self.request.read_only_storage_access,
                    "Created a new ephemeral workspace"
                );
                Ok::<_, WorkspaceApiError>(workspace)
            })
            .await
            .map_err(|e| {
                JobError::application(format!("Failed to create workspace: {e}"))
            })
    }

    /// Delete the workspace if it was ever created.
    pub async fn cleanup(&self) -> std::result::Result<(), WorkspaceApiError> {
        match self.workspace.get() {
            Some(workspace) => self.api.delete_workspace(&workspace.id).await,
            None => Ok(()),
        }
    }
}

/// Workspace the job uses but does not own.
#[derive(Debug, Clone, PartialEq)]
pub struct ExistingWorkspace {
    workspace: Workspace,
}

impl ExistingWorkspace {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }
}

/// Source of the workspace backing one staging type.
pub enum WorkspaceProvider {
    New(NewWorkspace),
    Existing(ExistingWorkspace),
    /// Staging type without a workspace; asking it for one is an error.
    Invalid(StagingType),
}

impl WorkspaceProvider {
    pub async fn workspace_id(&self) -> Result<String> {
        Ok(self.resolve().await?.id.clone())
    }

    pub async fn credentials(&self) -> Result<Map<String, Value>> {
        Ok(self.resolve().await?.credentials.clone())
    }

    pub async fn backend(&self) -> Result<String> {
        Ok(self.resolve().await?.backend.clone())
    }

    pub fn is_new(&self) -> bool {
        matches!(self, WorkspaceProvider::New(_))
    }

    async fn resolve(&self) -> Result<&Workspace> {
        match self {
            WorkspaceProvider::New(new) => new.workspace().await,
            WorkspaceProvider::Existing(existing) => Ok(existing.workspace()),
            WorkspaceProvider::Invalid(staging) => Err(JobError::application(format!(
                "Staging type \"{staging}\" does not provide a workspace."
            ))),
        }
    }
}

impl std::fmt::Debug for WorkspaceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkspaceProvider::New(new) => f
                .debug_struct("New")
                .field("request", &new.request)
                .field("created", &new.is_created())
                .finish(),
            WorkspaceProvider::Existing(existing) => {
                f.debug_tuple("Existing").field(existing.workspace()).finish()
            }
            WorkspaceProvider::Invalid(staging) => f.debug_tuple("Invalid").field(staging).finish(),
        }
    }
}

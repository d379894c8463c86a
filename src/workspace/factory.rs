use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::configuration::{Configuration, WorkspaceCredentials};
use crate::error::{JobError, Result};
use crate::specification::{ComponentSpecification, StagingType};

use super::{
    CreateWorkspace, ExistingWorkspace, LoginType, NewWorkspace, Workspace, WorkspaceApi,
    WorkspaceProvider,
};

/// Resolves and caches one [`WorkspaceProvider`] per staging type, so input
/// and output staging of the same type share a workspace.
///
/// Persistent workspaces are found by listing, then created or reused. Two
/// jobs of the same configuration starting together can both see an empty
/// list and both create one; the next run then picks the lowest id.
pub struct WorkspaceProviderFactory {
    api: Arc<dyn WorkspaceApi>,
    component_id: String,
    config_id: Option<String>,
    backend_size: Option<String>,
    external_credentials: Option<WorkspaceCredentials>,
    read_only_storage_access: bool,
    login_type: LoginType,
    providers: Mutex<HashMap<StagingType, Arc<WorkspaceProvider>>>,
}

impl WorkspaceProviderFactory {
    pub fn new(
        api: Arc<dyn WorkspaceApi>,
        component: &ComponentSpecification,
        configuration: &Configuration,
        config_id: Option<String>,
    ) -> Self {
        let backend = configuration
            .runtime
            .as_ref()
            .and_then(|runtime| runtime.backend.as_ref());

        let login_type = if component.use_snowflake_key_pair_auth() {
            LoginType::SnowflakeKeyPair
        } else {
            LoginType::Password
        };

        Self {
            api,
            component_id: component.id().to_string(),
            config_id: config_id.filter(|id| !id.is_empty()),
            backend_size: backend.and_then(|backend| backend.backend_type.clone()),
            external_credentials: configuration.workspace_credentials().cloned(),
            read_only_storage_access: configuration.read_only_storage_access(),
            login_type,
            providers: Mutex::new(HashMap::new()),
        }
    }

    /// Provider for `staging`, resolved on first request.
    pub async fn provider(&self, staging: StagingType) -> Result<Arc<WorkspaceProvider>> {
        let mut providers = self.providers.lock().await;
        if let Some(provider) = providers.get(&staging) {
            return Ok(provider.clone());
        }

        let provider = Arc::new(self.resolve(staging).await?);
        providers.insert(staging, provider.clone());
        Ok(provider)
    }

    /// Every provider handed out so far.
    pub async fn providers(&self) -> Vec<Arc<WorkspaceProvider>> {
        self.providers.lock().await.values().cloned().collect()
    }

    async fn resolve(&self, staging: StagingType) -> Result<WorkspaceProvider> {
        let Some(backend) = staging.workspace_backend() else {
            return Ok(WorkspaceProvider::Invalid(staging));
        };

        if let Some(credentials) = &self.external_credentials {
            tracing::info!(
                workspace_id = %credentials.id,
                staging = %staging,
                "Using workspace credentials supplied in the configuration"
            );
            return Ok(WorkspaceProvider::Existing(ExistingWorkspace::new(
                external_workspace(backend, credentials),
            )));
        }

        if staging.is_persistent_workspace() {
            if let Some(config_id) = &self.config_id {
                let workspace = self.persistent_workspace(backend, config_id).await?;
                return Ok(WorkspaceProvider::Existing(ExistingWorkspace::new(workspace)));
            }
        }

        tracing::info!(
            staging = %staging,
            read_only = self.read_only_storage_access,
            "Using an ephemeral workspace"
        );
        Ok(WorkspaceProvider::New(NewWorkspace::new(
            self.api.clone(),
            self.request(backend, None),
        )))
    }

    async fn persistent_workspace(&self, backend: &str, config_id: &str) -> Result<Workspace> {
        let mut existing = self
            .api
            .list_workspaces(&self.component_id, config_id)
            .await
            .map_err(|e| JobError::application(format!("Failed to list workspaces: {e}")))?;
        existing.sort_by(|a, b| a.numeric_id().cmp(&b.numeric_id()).then_with(|| a.id.cmp(&b.id)));

        let Some(oldest) = existing.first() else {
            let workspace = self
                .api
                .create_workspace(&self.request(backend, Some(config_id.to_string())))
                .await
                .map_err(|e| JobError::application(format!("Failed to create workspace: {e}")))?;
            tracing::info!(
                workspace_id = %workspace.id,
                backend,
                config_id,
                "Created a new persistent workspace"
            );
            return Ok(workspace);
        };

        if existing.len() > 1 {
            let ids: Vec<&str> = existing.iter().map(|w| w.id.as_str()).collect();
            tracing::warn!(
                workspace_ids = ?ids,
                chosen = %oldest.id,
                backend,
                config_id,
                "Multiple workspaces found for the configuration, using the one with the lowest id"
            );
        }

        tracing::info!(
            workspace_id = %oldest.id,
            backend,
            config_id,
            "Reusing persistent workspace"
        );
        self.api
            .reset_credentials(oldest)
            .await
            .map_err(|e| JobError::application(format!("Failed to reset workspace credentials: {e}")))
    }

    fn request(&self, backend: &str, config_id: Option<String>) -> CreateWorkspace {
        CreateWorkspace {
            component_id: self.component_id.clone(),
            config_id,
            backend: backend.to_string(),
            backend_size: self.backend_size.clone(),
            read_only_storage_access: self.read_only_storage_access,
            login_type: self.login_type,
        }
    }
}

fn external_workspace(backend: &str, credentials: &WorkspaceCredentials) -> Workspace {
    let mut connection = Map::new();
    if let Some(password) = &credentials.password {
        connection.insert("password".to_string(), Value::String(password.clone()));
    }
    if let Some(private_key) = &credentials.private_key {
        connection.insert("privateKey".to_string(), Value::String(private_key.clone()));
    }

    Workspace {
        id: credentials.id.clone(),
        backend: backend.to_string(),
        credentials: connection,
    }
}

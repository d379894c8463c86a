use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceCredentialsType {
    Snowflake,
}

/// Credentials of an externally managed workspace the job must use as-is.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceCredentials {
    pub id: String,
    #[serde(rename = "type")]
    pub credentials_type: WorkspaceCredentialsType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(
        rename = "privateKey",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub private_key: Option<String>,
}

impl std::fmt::Debug for WorkspaceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceCredentials")
            .field("id", &self.id)
            .field("credentials_type", &self.credentials_type)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("private_key", &self.private_key.as_ref().map(|_| "****"))
            .finish()
    }
}

/// Backend size/context the job asks for, plus optional external workspace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Backend {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub backend_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_credentials: Option<WorkspaceCredentials>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Runtime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_file_storage_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<Backend>,
}

impl Runtime {
    pub fn use_file_storage_only(&self) -> bool {
        self.use_file_storage_only.unwrap_or(false)
    }

    pub fn workspace_credentials(&self) -> Option<&WorkspaceCredentials> {
        self.backend.as_ref()?.workspace_credentials.as_ref()
    }
}

//! Domain error taxonomy shared by the aggregates and the data loaders.

use serde_json::Value;
use thiserror::Error;

use crate::schema::ConfigurationInvalid;

#[derive(Debug, Error)]
pub enum JobError {
    /// Component record does not fit its schema. Operator must fix the deployment.
    #[error("Component definition is invalid. Verify the deployment setup and the repository settings in the Developer Portal. Detail: {source}")]
    ComponentInvalid {
        source: ConfigurationInvalid,
        payload: Value,
    },

    /// Job configuration or state does not fit its schema.
    #[error("{source}")]
    InvalidData {
        source: ConfigurationInvalid,
        payload: Value,
    },

    /// Caused by the job's own configuration or rejected by Storage on its behalf.
    #[error("{0}")]
    User(String),

    /// Internal misconfiguration, not fixable by the end user.
    #[error("{0}")]
    Application(String),
}

pub type Result<T> = std::result::Result<T, JobError>;

impl JobError {
    pub fn user(message: impl Into<String>) -> Self {
        JobError::User(message.into())
    }

    pub fn application(message: impl Into<String>) -> Self {
        JobError::Application(message.into())
    }

    pub fn is_user_error(&self) -> bool {
        matches!(self, JobError::User(_))
    }

    /// Raw document that failed validation, for diagnostics.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            JobError::ComponentInvalid { payload, .. } | JobError::InvalidData { payload, .. } => {
                Some(payload)
            }
            _ => None,
        }
    }
}

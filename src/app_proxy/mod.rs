//! Authentication settings of the reverse proxy in front of data apps.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{JobError, Result};
use crate::schema::{AppProxyDefinition, ConfigurationInvalid, Definition};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthProvider {
    pub id: String,
    #[serde(rename = "type")]
    pub provider_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_roles: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthRuleType {
    #[serde(rename = "pathPrefix")]
    PathPrefix,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRule {
    #[serde(rename = "type")]
    pub rule_type: AuthRuleType,
    pub value: String,
    pub auth_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<Vec<String>>,
}

impl AuthRule {
    pub fn matches(&self, path: &str) -> bool {
        match self.rule_type {
            AuthRuleType::PathPrefix => path.starts_with(&self.value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppProxyConfiguration {
    #[serde(default)]
    pub auth_providers: Vec<AuthProvider>,
    #[serde(default)]
    pub auth_rules: Vec<AuthRule>,
}

impl AppProxyConfiguration {
    pub fn from_value(raw: &Value) -> Result<Self> {
        let invalid = |source: ConfigurationInvalid| JobError::InvalidData {
            source,
            payload: raw.clone(),
        };

        let normalized = AppProxyDefinition
            .process_configuration(raw)
            .map_err(invalid)?;
        serde_json::from_value(normalized)
            .map_err(|e| invalid(ConfigurationInvalid::new("app_proxy", e.to_string())))
    }

    /// First rule, in declaration order, whose prefix covers `path`.
    pub fn rule_for(&self, path: &str) -> Option<&AuthRule> {
        self.auth_rules.iter().find(|rule| rule.matches(path))
    }

    pub fn provider(&self, id: &str) -> Option<&AuthProvider> {
        self.auth_providers.iter().find(|provider| provider.id == id)
    }
}

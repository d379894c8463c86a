//! Validated configuration of a single job run.

mod artifacts;
mod processors;
mod runtime;
mod storage;

pub use artifacts::{Artifacts, Custom, CustomFilter, Options, Runs, RunsFilter, Shared};
pub use processors::{ProcessorDefinition, ProcessorImage, Processors};
pub use runtime::{Backend, Runtime, WorkspaceCredentials, WorkspaceCredentialsType};
pub use storage::{
    FilesList, Input, MappingEntry, Output, Storage, TableFiles, TableModifications, TablesList,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{JobError, Result};
use crate::schema::{ConfigurationDefinition, ConfigurationInvalid, Definition};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default = "empty_object")]
    pub parameters: Value,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub processors: Processors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<Runtime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables_values_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_code_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_code_row_ids: Vec<String>,
    #[serde(default = "empty_object")]
    pub image_parameters: Value,
    #[serde(default = "empty_object")]
    pub authorization: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default)]
    pub artifacts: Artifacts,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            parameters: empty_object(),
            storage: Storage::default(),
            processors: Processors::default(),
            runtime: None,
            variables_id: None,
            variables_values_id: None,
            shared_code_id: None,
            shared_code_row_ids: Vec::new(),
            image_parameters: empty_object(),
            authorization: empty_object(),
            action: None,
            artifacts: Artifacts::default(),
        }
    }
}

fn empty_object() -> Value {
    json!({})
}

impl Configuration {
    /// Validate a raw configuration document and build the typed view.
    pub fn from_value(raw: &Value) -> Result<Self> {
        let invalid = |source: ConfigurationInvalid| JobError::InvalidData {
            source,
            payload: raw.clone(),
        };

        let normalized = ConfigurationDefinition
            .process_configuration(raw)
            .map_err(invalid)?;

        serde_json::from_value(normalized)
            .map_err(|e| invalid(ConfigurationInvalid::new("configuration", e.to_string())))
    }

    /// Serialize back to the raw shape; unset optional keys are omitted.
    pub fn to_value(&self) -> Value {
        // Every field serializes to plain JSON, so this cannot fail.
        serde_json::to_value(self).unwrap_or_else(|_| empty_object())
    }

    /// Overlay `overrides` on this configuration and validate the result.
    ///
    /// Objects merge key by key. Lists merge by position: element `i` of the
    /// override replaces (or recursively merges into) element `i` of the
    /// base, trailing base elements are kept and extra override elements are
    /// appended. Overriding `storage.input.tables[1]` therefore needs a two
    /// element override list.
    pub fn merge(&self, overrides: &Value) -> Result<Self> {
        let mut merged = self.to_value();
        replace_recursive(&mut merged, overrides);
        Self::from_value(&merged)
    }

    pub fn runtime_image_tag(&self) -> Option<&str> {
        self.runtime
            .as_ref()?
            .image_tag
            .as_deref()
            .filter(|tag| !tag.is_empty())
    }

    pub fn use_file_storage_only(&self) -> bool {
        self.runtime
            .as_ref()
            .is_some_and(Runtime::use_file_storage_only)
    }

    pub fn workspace_credentials(&self) -> Option<&WorkspaceCredentials> {
        self.runtime.as_ref()?.workspace_credentials()
    }

    pub fn read_only_storage_access(&self) -> bool {
        self.storage.input.read_only_storage_access.unwrap_or(false)
    }
}

fn replace_recursive(base: &mut Value, overrides: &Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => merge_maps(base, overrides),
        (Value::Array(base), Value::Array(overrides)) => {
            for (index, value) in overrides.iter().enumerate() {
                match base.get_mut(index) {
                    Some(slot) => replace_recursive(slot, value),
                    None => base.push(value.clone()),
                }
            }
        }
        (base, overrides) => *base = overrides.clone(),
    }
}

fn merge_maps(base: &mut Map<String, Value>, overrides: &Map<String, Value>) {
    for (key, value) in overrides {
        match base.get_mut(key) {
            Some(slot) => replace_recursive(slot, value),
            None => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

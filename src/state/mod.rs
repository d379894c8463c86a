//! Incremental-load watermarks persisted between runs of one configuration.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{JobError, Result};
use crate::schema::{ConfigurationInvalid, Definition, StateDefinition};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableState {
    pub source: String,
    #[serde(rename = "lastImportDate")]
    pub last_import_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTag {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileState {
    pub tags: Vec<FileTag>,
    #[serde(rename = "lastImportId")]
    pub last_import_id: i64,
}

impl FileState {
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|tag| tag.name.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    #[serde(default)]
    pub tables: Vec<TableState>,
    #[serde(default)]
    pub files: Vec<FileState>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateStorage {
    #[serde(default)]
    pub input: InputState,
}

/// Read-only for the lifetime of a job; a new state is written elsewhere
/// once the job finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    #[serde(default = "empty_object")]
    pub component: Value,
    #[serde(default)]
    pub storage: StateStorage,
}

impl Default for State {
    fn default() -> Self {
        Self {
            component: empty_object(),
            storage: StateStorage::default(),
        }
    }
}

fn empty_object() -> Value {
    json!({})
}

impl State {
    pub fn from_value(raw: &Value) -> Result<Self> {
        let invalid = |source: ConfigurationInvalid| JobError::InvalidData {
            source,
            payload: raw.clone(),
        };

        let normalized = StateDefinition.process_configuration(raw).map_err(invalid)?;
        serde_json::from_value(normalized)
            .map_err(|e| invalid(ConfigurationInvalid::new("state", e.to_string())))
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| empty_object())
    }

    /// Watermark for a given source table, if it was imported before.
    pub fn table(&self, source: &str) -> Option<&TableState> {
        self.storage
            .input
            .tables
            .iter()
            .find(|table| table.source == source)
    }
}

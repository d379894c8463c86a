use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::specification::DataTypeSupport;

/// One mapping entry; its keys belong to the mapping SDK.
pub type MappingEntry = Map<String, Value>;

/// Ordered table mappings, passed through to the mapping SDK as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TablesList(Vec<MappingEntry>);

/// Ordered file mappings, passed through to the mapping SDK as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilesList(Vec<MappingEntry>);

macro_rules! mapping_list {
    ($name:ident) => {
        impl $name {
            pub fn new(entries: Vec<MappingEntry>) -> Self {
                Self(entries)
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn entries(&self) -> &[MappingEntry] {
                &self.0
            }

            pub fn iter(&self) -> std::slice::Iter<'_, MappingEntry> {
                self.0.iter()
            }
        }
    };
}

mapping_list!(TablesList);
mapping_list!(FilesList);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TableModifications {
    None,
    NonDestructive,
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Input {
    #[serde(default)]
    pub tables: TablesList,
    #[serde(default)]
    pub files: FilesList,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only_storage_access: Option<bool>,
}

/// Upload options for table data archived as plain files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableFiles {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_is_permanent")]
    pub is_permanent: bool,
}

impl Default for TableFiles {
    fn default() -> Self {
        Self {
            tags: Vec::new(),
            is_permanent: default_is_permanent(),
        }
    }
}

fn default_is_permanent() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Output {
    #[serde(default)]
    pub tables: TablesList,
    #[serde(default)]
    pub files: FilesList,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_files: Option<TableFiles>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type_support: Option<DataTypeSupport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_modifications: Option<TableModifications>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treat_values_as_null: Option<Vec<String>>,
}

impl Output {
    /// Explicit default bucket, empty strings count as unset.
    pub fn default_bucket(&self) -> Option<&str> {
        self.default_bucket.as_deref().filter(|b| !b.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Storage {
    #[serde(default)]
    pub input: Input,
    #[serde(default)]
    pub output: Output,
}

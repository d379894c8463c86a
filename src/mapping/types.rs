use crate::configuration::{FilesList, TableFiles, TableModifications, TablesList};
use crate::specification::{DataTypeSupport, StagingType};
use crate::state::{FileState, State, TableState};

use super::SystemMetadata;

/// Download switches passed to the reader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Read production tables even when the job runs in a dev branch.
    pub dev_inputs_disabled: bool,
    pub preserve_workspace: bool,
}

/// Table watermarks seeding an incremental download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputTableStateList(pub Vec<TableState>);

impl InputTableStateList {
    pub fn from_state(state: &State) -> Self {
        Self(state.storage.input.tables.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, source: &str) -> Option<&TableState> {
        self.0.iter().find(|table| table.source == source)
    }
}

/// File watermarks seeding an incremental download.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputFileStateList(pub Vec<FileState>);

impl InputFileStateList {
    pub fn from_state(state: &State) -> Self {
        Self(state.storage.input.files.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedTable {
    pub source: String,
    pub destination: String,
}

/// What the reader fetched plus the advanced watermarks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputTableResult {
    pub tables: Vec<DownloadedTable>,
    pub state: InputTableStateList,
}

impl InputTableResult {
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.state.is_empty()
    }
}

pub struct TablesDownload<'a> {
    pub mappings: &'a TablesList,
    pub state: &'a InputTableStateList,
    pub destination: &'a str,
    pub staging: StagingType,
    pub options: ReaderOptions,
}

pub struct FilesDownload<'a> {
    pub mappings: &'a FilesList,
    pub state: &'a InputFileStateList,
    pub destination: &'a str,
    pub staging: StagingType,
}

/// Table upload policy resolved from component, configuration and project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableUploadSettings {
    pub treat_values_as_null: Option<Vec<String>>,
    pub data_type_support: DataTypeSupport,
    pub table_modifications: Option<TableModifications>,
}

pub struct FilesUpload<'a> {
    pub source: &'a str,
    pub mappings: &'a FilesList,
    pub metadata: &'a SystemMetadata,
    pub staging: StagingType,
    pub is_failed_job: bool,
}

/// Table data shipped as plain files instead of Storage tables.
pub struct TableFilesUpload<'a> {
    pub source: &'a str,
    pub table_files: &'a TableFiles,
    pub metadata: &'a SystemMetadata,
    pub staging: StagingType,
}

pub struct TablesUpload<'a> {
    pub source: &'a str,
    pub mappings: &'a TablesList,
    pub default_bucket: Option<&'a str>,
    pub metadata: &'a SystemMetadata,
    pub staging: StagingType,
    pub settings: &'a TableUploadSettings,
    pub is_failed_job: bool,
}

//! In-process fakes of the external ports, recording every call.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::sync::{Arc, Mutex};

use jobqueue_staging::configuration::{Configuration, FilesList};
use jobqueue_staging::mapping::{
    self, DownloadedTable, FilesDownload, FilesUpload, InputFileStateList, InputReader,
    InputTableResult, LoadTableQueue, MappingError, OutputWriter, ReaderOptions, SystemMetadata,
    TableFilesUpload, TableUploadSettings, TablesDownload, TablesUpload,
};
use jobqueue_staging::specification::ComponentSpecification;
use jobqueue_staging::workspace::{self, CreateWorkspace, Workspace, WorkspaceApi, WorkspaceApiError};

pub fn component(extra_data: Value, features: &[&str]) -> ComponentSpecification {
    let mut data = json!({"definition": {"type": "aws-ecr", "uri": "147946154733.dkr.ecr.us-east-1.amazonaws.com/keboola/ex-generic"}});
    if let (Some(data), Some(extra)) = (data.as_object_mut(), extra_data.as_object()) {
        data.extend(extra.clone());
    }
    ComponentSpecification::new(json!({
        "id": "keboola.ex-generic",
        "data": data,
        "features": features,
    }))
    .unwrap()
}

pub fn configuration(raw: Value) -> Configuration {
    Configuration::from_value(&raw).unwrap()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TablesDownloadCall {
    pub sources: Vec<String>,
    pub destination: String,
    pub options: ReaderOptions,
    pub state_len: usize,
}

#[derive(Default)]
pub struct FakeReader {
    pub table_calls: Mutex<Vec<TablesDownloadCall>>,
    pub file_calls: Mutex<Vec<String>>,
    pub fail_with: Mutex<Option<MappingError>>,
}

impl FakeReader {
    pub fn failing(error: MappingError) -> Self {
        Self {
            fail_with: Mutex::new(Some(error)),
            ..Self::default()
        }
    }

    pub fn download_count(&self) -> usize {
        self.table_calls.lock().unwrap().len() + self.file_calls.lock().unwrap().len()
    }

    fn take_failure(&self) -> mapping::Result<()> {
        match self.fail_with.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl InputReader for FakeReader {
    async fn download_tables(&self, request: TablesDownload<'_>) -> mapping::Result<InputTableResult> {
        self.take_failure()?;
        let sources: Vec<String> = request
            .mappings
            .iter()
            .filter_map(|entry| entry.get("source").and_then(Value::as_str).map(String::from))
            .collect();
        self.table_calls.lock().unwrap().push(TablesDownloadCall {
            sources: sources.clone(),
            destination: request.destination.to_string(),
            options: request.options,
            state_len: request.state.0.len(),
        });

        Ok(InputTableResult {
            tables: sources
                .into_iter()
                .map(|source| DownloadedTable {
                    destination: format!("{source}.csv"),
                    source,
                })
                .collect(),
            state: request.state.clone(),
        })
    }

    async fn download_files(&self, request: FilesDownload<'_>) -> mapping::Result<InputFileStateList> {
        self.take_failure()?;
        self.file_calls
            .lock()
            .unwrap()
            .push(request.destination.to_string());
        Ok(request.state.clone())
    }
}

pub struct FakeQueue(pub usize);

#[async_trait]
impl LoadTableQueue for FakeQueue {
    async fn wait_for_all(&self) -> mapping::Result<()> {
        Ok(())
    }

    fn task_count(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriterCall {
    Files {
        source: String,
        is_failed_job: bool,
        metadata: SystemMetadata,
    },
    TableFiles {
        source: String,
        tags: Vec<String>,
    },
    Tables {
        source: String,
        default_bucket: Option<String>,
        settings: TableUploadSettings,
        metadata: SystemMetadata,
    },
    TagInputFiles(usize),
}

#[derive(Default)]
pub struct FakeWriter {
    pub calls: Mutex<Vec<WriterCall>>,
    pub fail_tables_with: Mutex<Option<MappingError>>,
}

impl FakeWriter {
    pub fn calls(&self) -> Vec<WriterCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl OutputWriter for FakeWriter {
    async fn upload_files(&self, request: FilesUpload<'_>) -> mapping::Result<()> {
        self.calls.lock().unwrap().push(WriterCall::Files {
            source: request.source.to_string(),
            is_failed_job: request.is_failed_job,
            metadata: request.metadata.clone(),
        });
        Ok(())
    }

    async fn upload_table_files(&self, request: TableFilesUpload<'_>) -> mapping::Result<()> {
        self.calls.lock().unwrap().push(WriterCall::TableFiles {
            source: request.source.to_string(),
            tags: request.table_files.tags.clone(),
        });
        Ok(())
    }

    async fn upload_tables(&self, request: TablesUpload<'_>) -> mapping::Result<Box<dyn LoadTableQueue>> {
        if let Some(error) = self.fail_tables_with.lock().unwrap().take() {
            return Err(error);
        }
        self.calls.lock().unwrap().push(WriterCall::Tables {
            source: request.source.to_string(),
            default_bucket: request.default_bucket.map(String::from),
            settings: request.settings.clone(),
            metadata: request.metadata.clone(),
        });
        Ok(Box::new(FakeQueue(request.mappings.len())))
    }

    async fn tag_input_files(&self, files: &FilesList) -> mapping::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(WriterCall::TagInputFiles(files.len()));
        Ok(())
    }
}

/// Workspace API backed by a fixed list of existing workspaces.
#[derive(Default)]
pub struct FakeWorkspaceApi {
    pub existing: Vec<Workspace>,
    pub calls: Mutex<Vec<String>>,
    pub delete_status: Mutex<Option<u16>>,
    next_id: Mutex<u64>,
}

impl FakeWorkspaceApi {
    pub fn with_existing(ids: &[&str], backend: &str) -> Self {
        Self {
            existing: ids.iter().map(|id| workspace(id, backend)).collect(),
            ..Self::default()
        }
    }

    pub fn failing_delete(status: u16) -> Self {
        Self {
            delete_status: Mutex::new(Some(status)),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn workspace(id: &str, backend: &str) -> Workspace {
    let mut credentials = Map::new();
    credentials.insert("container".to_string(), json!(format!("ws-{id}")));
    Workspace {
        id: id.to_string(),
        backend: backend.to_string(),
        credentials,
    }
}

#[async_trait]
impl WorkspaceApi for FakeWorkspaceApi {
    async fn list_workspaces(&self, component_id: &str, config_id: &str) -> workspace::Result<Vec<Workspace>> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("list {component_id}/{config_id}"));
        Ok(self.existing.clone())
    }

    async fn create_workspace(&self, request: &CreateWorkspace) -> workspace::Result<Workspace> {
        let id = {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            1000 + *next_id
        };
        self.calls.lock().unwrap().push(format!(
            "create {} config={}",
            request.backend,
            request.config_id.as_deref().unwrap_or("-")
        ));
        Ok(workspace(&id.to_string(), &request.backend))
    }

    async fn reset_credentials(&self, workspace: &Workspace) -> workspace::Result<Workspace> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("reset {}", workspace.id));
        Ok(workspace.clone())
    }

    async fn delete_workspace(&self, workspace_id: &str) -> workspace::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("delete {workspace_id}"));
        match *self.delete_status.lock().unwrap() {
            Some(status) => Err(WorkspaceApiError::new(Some(status), "delete failed")),
            None => Ok(()),
        }
    }
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}

//! Ports to the input/output mapping SDK that moves data between Storage
//! and the job's staging area.

mod metadata;
mod types;

pub use metadata::SystemMetadata;
pub use types::{
    DownloadedTable, FilesDownload, FilesUpload, InputFileStateList, InputTableResult,
    InputTableStateList, ReaderOptions, TableFilesUpload, TableUploadSettings, TablesDownload,
    TablesUpload,
};

use async_trait::async_trait;
use thiserror::Error;

use crate::configuration::FilesList;

#[derive(Debug, Error)]
pub enum MappingError {
    /// Input mapping rejected before any transfer.
    #[error("{0}")]
    InvalidInput(String),

    /// Output mapping does not match what the job produced.
    #[error("{0}")]
    InvalidOutput(String),

    /// Storage API refused the request.
    #[error("{message}")]
    Client { status: Option<u16>, message: String },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, MappingError>;

/// Downloads tables and files described by the input mapping.
#[async_trait]
pub trait InputReader: Send + Sync {
    async fn download_tables(&self, request: TablesDownload<'_>) -> Result<InputTableResult>;

    async fn download_files(&self, request: FilesDownload<'_>) -> Result<InputFileStateList>;
}

/// Deferred table import jobs started by an upload.
#[async_trait]
pub trait LoadTableQueue: Send + Sync {
    async fn wait_for_all(&self) -> Result<()>;

    fn task_count(&self) -> usize;
}

impl std::fmt::Debug for dyn LoadTableQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadTableQueue")
            .field("task_count", &self.task_count())
            .finish()
    }
}

/// Uploads what the job left in its output staging area.
#[async_trait]
pub trait OutputWriter: Send + Sync {
    async fn upload_files(&self, request: FilesUpload<'_>) -> Result<()>;

    async fn upload_table_files(&self, request: TableFilesUpload<'_>) -> Result<()>;

    async fn upload_tables(&self, request: TablesUpload<'_>) -> Result<Box<dyn LoadTableQueue>>;

    /// Mark the input files of this run as processed.
    async fn tag_input_files(&self, files: &FilesList) -> Result<()>;
}

/// Queue that is already drained.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyLoadTableQueue;

#[async_trait]
impl LoadTableQueue for EmptyLoadTableQueue {
    async fn wait_for_all(&self) -> Result<()> {
        Ok(())
    }

    fn task_count(&self) -> usize {
        0
    }
}

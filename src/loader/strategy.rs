use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{JobError, Result};
use crate::specification::{ComponentSpecification, StagingType};
use crate::workspace::{WorkspaceProvider, WorkspaceProviderFactory};

pub const INPUT_TABLES_DIR: &str = "in/tables";
pub const INPUT_FILES_DIR: &str = "in/files";
pub const OUTPUT_TABLES_DIR: &str = "out/tables";
pub const OUTPUT_FILES_DIR: &str = "out/files";

/// Staging types of both directions and the providers backing them.
#[derive(Debug, Clone)]
pub struct StagingStrategy {
    input: StagingType,
    output: StagingType,
    input_provider: Arc<WorkspaceProvider>,
    output_provider: Arc<WorkspaceProvider>,
    data_dir: PathBuf,
}

impl StagingStrategy {
    pub async fn new(
        component: &ComponentSpecification,
        factory: &WorkspaceProviderFactory,
        data_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let input = component.input_staging_storage();
        let output = component.output_staging_storage();
        check_staging(input, output)?;

        Ok(Self {
            input,
            output,
            input_provider: factory.provider(input).await?,
            output_provider: factory.provider(output).await?,
            data_dir: data_dir.into(),
        })
    }

    pub fn input_staging(&self) -> StagingType {
        self.input
    }

    pub fn output_staging(&self) -> StagingType {
        self.output
    }

    pub fn input_provider(&self) -> &Arc<WorkspaceProvider> {
        &self.input_provider
    }

    pub fn output_provider(&self) -> &Arc<WorkspaceProvider> {
        &self.output_provider
    }

    /// Providers of both directions, possibly the same one twice.
    pub fn providers(&self) -> [Arc<WorkspaceProvider>; 2] {
        [self.input_provider.clone(), self.output_provider.clone()]
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Absolute location of one of the staging directories.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.data_dir.join(relative)
    }
}

/// Input and output workspaces must be of the same kind.
pub fn check_staging(input: StagingType, output: StagingType) -> Result<()> {
    if input.is_workspace() && output.is_workspace() && input != output {
        return Err(JobError::application(format!(
            "Component staging setting mismatch - input: \"{input}\", output: \"{output}\"."
        )));
    }
    Ok(())
}

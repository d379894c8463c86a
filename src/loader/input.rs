use std::sync::Arc;

use crate::configuration::Configuration;
use crate::error::{JobError, Result};
use crate::mapping::{
    FilesDownload, InputFileStateList, InputReader, InputTableResult, InputTableStateList,
    MappingError, ReaderOptions, TablesDownload,
};
use crate::specification::ComponentSpecification;
use crate::state::State;

use super::strategy::{INPUT_FILES_DIR, INPUT_TABLES_DIR, StagingStrategy};

/// Everything the reader fetched for one job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadInputDataResult {
    pub input_table_result: InputTableResult,
    pub input_file_state_list: InputFileStateList,
}

/// Downloads a job's input mapping into its input staging.
pub struct InputDataLoader {
    reader: Arc<dyn InputReader>,
    component: Arc<ComponentSpecification>,
    configuration: Arc<Configuration>,
    state: Arc<State>,
    strategy: Arc<StagingStrategy>,
}

impl InputDataLoader {
    pub fn new(
        reader: Arc<dyn InputReader>,
        component: Arc<ComponentSpecification>,
        configuration: Arc<Configuration>,
        state: Arc<State>,
        strategy: Arc<StagingStrategy>,
    ) -> Self {
        Self {
            reader,
            component,
            configuration,
            state,
            strategy,
        }
    }

    /// Download input tables, then input files. With an empty input mapping
    /// nothing is contacted and nothing is logged.
    pub async fn load_input_data(&self) -> Result<LoadInputDataResult> {
        let input = &self.configuration.storage.input;
        let staging = self.strategy.input_staging();
        let mut result = LoadInputDataResult::default();

        if !input.tables.is_empty() {
            tracing::info!(count = input.tables.len(), staging = %staging, "Downloading input tables");
            let state = InputTableStateList::from_state(&self.state);
            let request = TablesDownload {
                mappings: &input.tables,
                state: &state,
                destination: INPUT_TABLES_DIR,
                staging,
                options: ReaderOptions {
                    dev_inputs_disabled: !self.component.allow_branch_mapping(),
                    preserve_workspace: false,
                },
            };
            result.input_table_result = self
                .reader
                .download_tables(request)
                .await
                .map_err(input_error)?;
        }

        if !input.files.is_empty() {
            tracing::info!(count = input.files.len(), staging = %staging, "Downloading input files");
            let state = InputFileStateList::from_state(&self.state);
            let request = FilesDownload {
                mappings: &input.files,
                state: &state,
                destination: INPUT_FILES_DIR,
                staging,
            };
            result.input_file_state_list = self
                .reader
                .download_files(request)
                .await
                .map_err(input_error)?;
        }

        Ok(result)
    }
}

fn input_error(error: MappingError) -> JobError {
    match error {
        MappingError::Client { message, .. } => {
            JobError::user(format!("Cannot import data from Storage API: {message}"))
        }
        MappingError::InvalidInput(message) | MappingError::InvalidOutput(message) => {
            JobError::user(message)
        }
        MappingError::Other(message) => JobError::application(message),
    }
}

/// Builds [`InputDataLoader`]s sharing one reader.
#[derive(Clone)]
pub struct InputDataLoaderFactory {
    reader: Arc<dyn InputReader>,
}

impl InputDataLoaderFactory {
    pub fn new(reader: Arc<dyn InputReader>) -> Self {
        Self { reader }
    }

    pub fn create(
        &self,
        component: Arc<ComponentSpecification>,
        configuration: Arc<Configuration>,
        state: Arc<State>,
        strategy: Arc<StagingStrategy>,
    ) -> InputDataLoader {
        InputDataLoader::new(self.reader.clone(), component, configuration, state, strategy)
    }
}

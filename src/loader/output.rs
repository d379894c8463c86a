use std::sync::Arc;

use crate::client::{JobStorageApiClientOptions, StorageSession};
use crate::configuration::Configuration;
use crate::error::{JobError, Result};
use crate::mapping::{
    FilesUpload, LoadTableQueue, MappingError, OutputWriter, SystemMetadata, TableFilesUpload,
    TableUploadSettings, TablesUpload,
};
use crate::specification::{ComponentSpecification, DataTypeSupport};

use super::strategy::{OUTPUT_FILES_DIR, OUTPUT_TABLES_DIR, StagingStrategy};

/// Data type handling for table uploads.
///
/// Projects without native types always get [`DataTypeSupport::None`].
/// Otherwise the configuration's setting wins over the component's
/// declared one.
pub fn data_type_support(
    component: &ComponentSpecification,
    configuration: &Configuration,
    session: &StorageSession,
) -> DataTypeSupport {
    if !session.has_new_native_types() {
        return DataTypeSupport::None;
    }

    configuration
        .storage
        .output
        .data_type_support
        .or(component.declared_data_types_support())
        .unwrap_or_default()
}

/// Uploads what a job produced from its output staging.
pub struct OutputDataLoader {
    writer: Arc<dyn OutputWriter>,
    component: Arc<ComponentSpecification>,
    configuration: Arc<Configuration>,
    strategy: Arc<StagingStrategy>,
    session: StorageSession,
    client_options: JobStorageApiClientOptions,
    config_id: Option<String>,
    config_row_id: Option<String>,
}

impl OutputDataLoader {
    /// Bucket for output tables without an explicit destination bucket.
    pub fn default_bucket(&self) -> Result<Option<String>> {
        if let Some(bucket) = self.configuration.storage.output.default_bucket() {
            return Ok(Some(bucket.to_string()));
        }
        if !self.component.has_default_bucket() {
            return Ok(None);
        }

        match &self.config_id {
            Some(config_id) => Ok(Some(self.component.default_bucket_name(config_id))),
            None => Err(JobError::user(
                "Configuration ID not set, but is required for default_bucket option.",
            )),
        }
    }

    pub fn system_metadata(&self) -> SystemMetadata {
        SystemMetadata {
            component_id: self.component.id().to_string(),
            configuration_id: self.config_id.clone(),
            configuration_row_id: self.config_row_id.clone(),
            branch_id: self.session.dev_branch_id().map(String::from),
            run_id: self.client_options.run_id.clone(),
        }
    }

    pub fn data_type_support(&self) -> DataTypeSupport {
        data_type_support(&self.component, &self.configuration, &self.session)
    }

    /// Connection options with the job's requested backend applied.
    pub fn client_options(&self) -> &JobStorageApiClientOptions {
        &self.client_options
    }

    /// Upload output files, then output tables.
    ///
    /// Returns the queue of table imports to wait for, or `None` when tables
    /// were shipped as plain files.
    pub async fn store_output(&self, is_failed_job: bool) -> Result<Option<Box<dyn LoadTableQueue>>> {
        let output = &self.configuration.storage.output;
        let staging = self.strategy.output_staging();
        let default_bucket = self.default_bucket()?;
        let metadata = self.system_metadata();

        tracing::info!(count = output.files.len(), is_failed_job, "Uploading output files");
        self.writer
            .upload_files(FilesUpload {
                source: OUTPUT_FILES_DIR,
                mappings: &output.files,
                metadata: &metadata,
                staging,
                is_failed_job,
            })
            .await
            .map_err(output_error)?;

        if self.component.allow_use_file_storage_only() && self.configuration.use_file_storage_only() {
            tracing::info!("Uploading output tables to file storage only");
            let table_files = output.table_files.clone().unwrap_or_default();
            self.writer
                .upload_table_files(TableFilesUpload {
                    source: OUTPUT_TABLES_DIR,
                    table_files: &table_files,
                    metadata: &metadata,
                    staging,
                })
                .await
                .map_err(output_error)?;
            self.tag_input_files().await?;
            return Ok(None);
        }

        let settings = TableUploadSettings {
            treat_values_as_null: output.treat_values_as_null.clone(),
            data_type_support: self.data_type_support(),
            table_modifications: output.table_modifications,
        };
        tracing::info!(
            count = output.tables.len(),
            default_bucket = default_bucket.as_deref(),
            data_type_support = settings.data_type_support.as_str(),
            "Uploading output tables"
        );
        let table_metadata = metadata.without_run_id();
        let queue = self
            .writer
            .upload_tables(TablesUpload {
                source: OUTPUT_TABLES_DIR,
                mappings: &output.tables,
                default_bucket: default_bucket.as_deref(),
                metadata: &table_metadata,
                staging,
                settings: &settings,
                is_failed_job,
            })
            .await
            .map_err(output_error)?;

        if !is_failed_job {
            self.tag_input_files().await?;
        }

        Ok(Some(queue))
    }

    async fn tag_input_files(&self) -> Result<()> {
        let files = &self.configuration.storage.input.files;
        if files.is_empty() {
            return Ok(());
        }
        self.writer.tag_input_files(files).await.map_err(output_error)
    }
}

fn output_error(error: MappingError) -> JobError {
    match error {
        MappingError::InvalidOutput(message) | MappingError::InvalidInput(message) => {
            JobError::user(message)
        }
        MappingError::Client { message, .. } => {
            JobError::user(format!("Cannot upload data to Storage API: {message}"))
        }
        MappingError::Other(message) => JobError::application(message),
    }
}

/// Builds [`OutputDataLoader`]s bound to one Storage API connection.
#[derive(Clone)]
pub struct OutputDataLoaderFactory {
    writer: Arc<dyn OutputWriter>,
    session: StorageSession,
    client_options: JobStorageApiClientOptions,
}

impl OutputDataLoaderFactory {
    pub fn new(
        writer: Arc<dyn OutputWriter>,
        session: StorageSession,
        client_options: JobStorageApiClientOptions,
    ) -> Self {
        Self {
            writer,
            session,
            client_options,
        }
    }

    pub fn create(
        &self,
        component: Arc<ComponentSpecification>,
        configuration: Arc<Configuration>,
        strategy: Arc<StagingStrategy>,
        config_id: Option<String>,
        config_row_id: Option<String>,
    ) -> OutputDataLoader {
        let backend = configuration.runtime.as_ref().and_then(|r| r.backend.as_ref());
        let client_options = match backend {
            Some(backend) => self
                .client_options
                .with_backend(backend.backend_type.clone(), backend.context.clone()),
            None => self.client_options.clone(),
        };

        OutputDataLoader {
            writer: self.writer.clone(),
            component,
            configuration,
            strategy,
            session: self.session.clone(),
            client_options,
            config_id: config_id.filter(|id| !id.is_empty()),
            config_row_id: config_row_id.filter(|id| !id.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::collections::BTreeSet;

    fn component(data_types: Option<&str>) -> ComponentSpecification {
        let mut raw = json!({
            "id": "keboola.ex-generic",
            "data": {"definition": {"type": "aws-ecr", "uri": "repo/ex-generic"}},
        });
        if let Some(support) = data_types {
            raw["dataTypesConfiguration"] = json!({"dataTypesSupport": support});
        }
        ComponentSpecification::new(raw).unwrap()
    }

    fn configuration(data_types: Option<&str>) -> Configuration {
        let raw = match data_types {
            Some(support) => json!({"storage": {"output": {"data_type_support": support}}}),
            None => Value::Null,
        };
        Configuration::from_value(&raw).unwrap()
    }

    fn session(native_types: bool) -> StorageSession {
        let features = if native_types {
            BTreeSet::from(["new-native-types".to_string()])
        } else {
            BTreeSet::new()
        };
        StorageSession::builder().project_features(features).build()
    }

    #[test]
    fn test_without_native_types_always_none() {
        let session = session(false);
        for (component_value, config_value) in [
            (None, None),
            (Some("authoritative"), None),
            (None, Some("hints")),
            (Some("hints"), Some("authoritative")),
        ] {
            assert_eq!(
                data_type_support(&component(component_value), &configuration(config_value), &session),
                DataTypeSupport::None
            );
        }
    }

    #[test]
    fn test_configuration_beats_component() {
        let session = session(true);
        assert_eq!(
            data_type_support(&component(Some("hints")), &configuration(Some("authoritative")), &session),
            DataTypeSupport::Authoritative
        );
        assert_eq!(
            data_type_support(&component(Some("hints")), &configuration(None), &session),
            DataTypeSupport::Hints
        );
        assert_eq!(
            data_type_support(&component(None), &configuration(None), &session),
            DataTypeSupport::None
        );
    }

    #[test]
    fn test_client_error_on_upload_is_user_error() {
        let err = output_error(MappingError::Client {
            status: Some(400),
            message: "Invalid column name".to_string(),
        });
        assert!(err.is_user_error());
        assert_eq!(err.to_string(), "Cannot upload data to Storage API: Invalid column name");
    }
}

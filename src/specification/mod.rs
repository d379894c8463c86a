//! Typed view over a deployed component's capability declaration.

mod features;
mod types;

pub use features::{Feature, Features};
pub use types::{
    AllowedProcessorPosition, ConfigurationFormat, DataTypeSupport, DefaultBucketStage,
    GelfServerType, ImageType, LoggingConfiguration, NetworkType, StagingType, Verbosity,
};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{JobError, Result};
use crate::humanize::ByteSize;
use crate::schema::{ComponentSpecificationDefinition, ConfigurationInvalid, Definition};

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct ImageDefinition {
    #[serde(rename = "type")]
    image_type: ImageType,
    uri: String,
    tag: String,
    digest: Option<String>,
    repository: Option<Value>,
    build_options: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct StagingStorage {
    input: StagingType,
    output: StagingType,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Logging {
    #[serde(rename = "type")]
    logging_type: String,
    verbosity: BTreeMap<String, Verbosity>,
    gelf_server_type: GelfServerType,
    no_application_errors: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct ComponentData {
    definition: ImageDefinition,
    memory: String,
    configuration_format: ConfigurationFormat,
    process_timeout: u64,
    forward_token: bool,
    forward_token_details: bool,
    default_bucket: bool,
    default_bucket_stage: DefaultBucketStage,
    staging_storage: StagingStorage,
    synchronous_actions: Vec<String>,
    image_parameters: Value,
    network: NetworkType,
    logging: Logging,
    vendor: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct DataTypesConfiguration {
    #[serde(rename = "dataTypesSupport")]
    data_types_support: Option<DataTypeSupport>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct ProcessorConfiguration {
    #[serde(rename = "allowedProcessorPosition")]
    allowed_processor_position: Option<AllowedProcessorPosition>,
}

/// A component's deployment specification, validated at construction.
///
/// Everything except the image tag is fixed once built; the tag can be
/// pinned with [`ComponentSpecification::set_image_tag`] before launch.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSpecification {
    raw: Value,
    id: String,
    data: ComponentData,
    memory_limit: ByteSize,
    features: Features,
    data_types: DataTypesConfiguration,
    processors: ProcessorConfiguration,
}

impl ComponentSpecification {
    /// Build from the raw record returned by the deployment service:
    /// `{id, data, features, dataTypesConfiguration, processorConfiguration}`.
    pub fn new(raw: Value) -> Result<Self> {
        let invalid = |source: ConfigurationInvalid| JobError::ComponentInvalid {
            source,
            payload: raw.clone(),
        };

        let normalized = ComponentSpecificationDefinition
            .process_configuration(&raw)
            .map_err(invalid)?;

        let id = normalized["id"].as_str().unwrap_or_default().to_string();
        let data: ComponentData = typed(&normalized, "data").map_err(invalid)?;
        let memory_limit = data
            .memory
            .parse::<ByteSize>()
            .map_err(|e| invalid(ConfigurationInvalid::new("component.data.memory", e.to_string())))?;
        let names: Vec<String> = typed(&normalized, "features").map_err(invalid)?;
        let data_types = optional_typed(&normalized, "dataTypesConfiguration").map_err(invalid)?;
        let processors = optional_typed(&normalized, "processorConfiguration").map_err(invalid)?;

        Ok(Self {
            raw,
            id,
            data,
            memory_limit,
            features: Features::from_names(names),
            data_types,
            processors,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Component id with every character outside `[a-zA-Z0-9-]` replaced by `-`.
    pub fn sanitized_component_id(&self) -> String {
        sanitize_component_id(&self.id)
    }

    pub fn memory_limit(&self) -> &str {
        &self.data.memory
    }

    pub fn memory_limit_bytes(&self) -> u64 {
        self.memory_limit.as_u64()
    }

    pub fn process_timeout(&self) -> Duration {
        Duration::from_secs(self.data.process_timeout)
    }

    pub fn image_uri(&self) -> &str {
        &self.data.definition.uri
    }

    pub fn image_tag(&self) -> &str {
        &self.data.definition.tag
    }

    pub fn set_image_tag(&mut self, tag: impl Into<String>) {
        self.data.definition.tag = tag.into();
    }

    pub fn image_type(&self) -> ImageType {
        self.data.definition.image_type
    }

    pub fn image_digest(&self) -> Option<&str> {
        self.data.definition.digest.as_deref()
    }

    pub fn image_repository(&self) -> Option<&Value> {
        self.data.definition.repository.as_ref()
    }

    pub fn image_build_options(&self) -> Option<&Value> {
        self.data.definition.build_options.as_ref()
    }

    /// `{uri}:{tag}`, where `custom_tag` overrides the declared tag.
    pub fn image_uri_with_tag(&self, custom_tag: Option<&str>) -> String {
        format!(
            "{}:{}",
            self.image_uri(),
            custom_tag.unwrap_or(self.image_tag())
        )
    }

    pub fn network_type(&self) -> NetworkType {
        self.data.network
    }

    pub fn configuration_format(&self) -> ConfigurationFormat {
        self.data.configuration_format
    }

    pub fn input_staging_storage(&self) -> StagingType {
        self.data.staging_storage.input
    }

    pub fn output_staging_storage(&self) -> StagingType {
        self.data.staging_storage.output
    }

    pub fn forward_token(&self) -> bool {
        self.data.forward_token
    }

    pub fn forward_token_details(&self) -> bool {
        self.data.forward_token_details
    }

    pub fn has_default_bucket(&self) -> bool {
        self.data.default_bucket
    }

    pub fn default_bucket_stage(&self) -> DefaultBucketStage {
        self.data.default_bucket_stage
    }

    /// `{stage}.c-{sanitized id}-{config id}`
    pub fn default_bucket_name(&self, config_id: &str) -> String {
        format!(
            "{}.c-{}-{}",
            self.default_bucket_stage().as_str(),
            self.sanitized_component_id(),
            config_id
        )
    }

    pub fn synchronous_actions(&self) -> &[String] {
        &self.data.synchronous_actions
    }

    pub fn image_parameters(&self) -> &Value {
        &self.data.image_parameters
    }

    pub fn vendor(&self) -> Option<&Value> {
        self.data.vendor.as_ref()
    }

    pub fn logging_configuration(&self) -> Result<LoggingConfiguration> {
        match self.data.logging.logging_type.as_str() {
            "standard" => Ok(LoggingConfiguration::Standard),
            "gelf" => Ok(LoggingConfiguration::Gelf {
                server_type: self.data.logging.gelf_server_type,
            }),
            other => Err(JobError::ComponentInvalid {
                source: ConfigurationInvalid::new(
                    "component.data.logging.type",
                    format!("Unknown logging type \"{other}\""),
                ),
                payload: self.raw.clone(),
            }),
        }
    }

    /// Verbosity per log severity level (`"100"` .. `"600"`).
    pub fn logging_verbosity(&self) -> &BTreeMap<String, Verbosity> {
        &self.data.logging.verbosity
    }

    pub fn is_application_errors_disabled(&self) -> bool {
        self.data.logging.no_application_errors
    }

    pub fn data_types_support(&self) -> DataTypeSupport {
        self.data_types.data_types_support.unwrap_or_default()
    }

    /// Declared support, `None` when the component does not declare any.
    pub fn declared_data_types_support(&self) -> Option<DataTypeSupport> {
        self.data_types.data_types_support
    }

    pub fn allowed_processor_position(&self) -> AllowedProcessorPosition {
        self.processors.allowed_processor_position.unwrap_or_default()
    }

    pub fn features(&self) -> &Features {
        &self.features
    }

    pub fn run_as_root(&self) -> bool {
        self.features.contains(Feature::ContainerRootUser)
    }

    pub fn allow_branch_mapping(&self) -> bool {
        self.features.contains(Feature::DevMappingAllowed)
    }

    pub fn block_branch_jobs(&self) -> bool {
        self.features.contains(Feature::DevBranchJobBlocked)
    }

    pub fn branch_configurations_are_unsafe(&self) -> bool {
        self.features.contains(Feature::DevBranchConfigurationUnsafe)
    }

    pub fn has_no_swap(&self) -> bool {
        self.features.contains(Feature::NoSwap)
    }

    pub fn allow_use_file_storage_only(&self) -> bool {
        self.features.contains(Feature::AllowUseFileStorageOnly)
    }

    pub fn use_snowflake_key_pair_auth(&self) -> bool {
        self.features.contains(Feature::SnowflakeKeyPairAuth)
    }

    pub fn override_keepalive_60s(&self) -> bool {
        self.features.contains(Feature::ContainerTcpKeepalive60sOverride)
    }
}

pub fn sanitize_component_id(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect()
}

fn typed<T: DeserializeOwned>(
    normalized: &Value,
    key: &str,
) -> std::result::Result<T, ConfigurationInvalid> {
    serde_json::from_value(normalized[key].clone())
        .map_err(|e| ConfigurationInvalid::new(format!("component.{key}"), e.to_string()))
}

fn optional_typed<T: DeserializeOwned + Default>(
    normalized: &Value,
    key: &str,
) -> std::result::Result<T, ConfigurationInvalid> {
    match normalized.get(key) {
        Some(_) => typed(normalized, key),
        None => Ok(T::default()),
    }
}

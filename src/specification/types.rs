use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a component's input or output data is staged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StagingType {
    Local,
    S3,
    Abs,
    None,
    WorkspaceSnowflake,
    WorkspaceRedshift,
    WorkspaceSynapse,
    WorkspaceAbs,
    WorkspaceExasol,
    WorkspaceTeradata,
    WorkspaceBigquery,
}

impl StagingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StagingType::Local => "local",
            StagingType::S3 => "s3",
            StagingType::Abs => "abs",
            StagingType::None => "none",
            StagingType::WorkspaceSnowflake => "workspace-snowflake",
            StagingType::WorkspaceRedshift => "workspace-redshift",
            StagingType::WorkspaceSynapse => "workspace-synapse",
            StagingType::WorkspaceAbs => "workspace-abs",
            StagingType::WorkspaceExasol => "workspace-exasol",
            StagingType::WorkspaceTeradata => "workspace-teradata",
            StagingType::WorkspaceBigquery => "workspace-bigquery",
        }
    }

    pub fn is_workspace(&self) -> bool {
        self.workspace_backend().is_some()
    }

    /// Storage backend name of a workspace staging type.
    pub fn workspace_backend(&self) -> Option<&'static str> {
        self.as_str().strip_prefix("workspace-")
    }

    /// ABS and Redshift workspaces are kept per configuration between jobs.
    pub fn is_persistent_workspace(&self) -> bool {
        matches!(self, StagingType::WorkspaceAbs | StagingType::WorkspaceRedshift)
    }
}

impl fmt::Display for StagingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StagingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map_err(|_| format!("unknown staging type \"{s}\""))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataTypeSupport {
    Authoritative,
    Hints,
    #[default]
    None,
}

impl DataTypeSupport {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataTypeSupport::Authoritative => "authoritative",
            DataTypeSupport::Hints => "hints",
            DataTypeSupport::None => "none",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllowedProcessorPosition {
    #[default]
    Any,
    Before,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NetworkType {
    None,
    Bridge,
    NoInternet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigurationFormat {
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageType {
    Dockerhub,
    DockerhubPrivate,
    Quayio,
    QuayioPrivate,
    AwsEcr,
    Builder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultBucketStage {
    In,
    Out,
}

impl DefaultBucketStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefaultBucketStage::In => "in",
            DefaultBucketStage::Out => "out",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GelfServerType {
    Tcp,
    Udp,
    Http,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    None,
    Normal,
    Verbose,
    Camouflage,
}

/// How the container's log output is collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingConfiguration {
    Standard,
    Gelf { server_type: GelfServerType },
}

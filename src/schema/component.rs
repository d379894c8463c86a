use serde_json::{Value, json};
use std::sync::LazyLock;

use super::node::{ExtraKeys, Node};
use super::Definition;
use crate::humanize::ByteSize;

pub const NETWORK_TYPES: &[&str] = &["none", "bridge", "no-internet"];
pub const CONFIGURATION_FORMATS: &[&str] = &["json", "yaml"];
pub const IMAGE_TYPES: &[&str] = &[
    "dockerhub",
    "dockerhub-private",
    "quayio",
    "quayio-private",
    "aws-ecr",
    "builder",
];
pub const DEFAULT_BUCKET_STAGES: &[&str] = &["in", "out"];
pub const LOGGING_TYPES: &[&str] = &["standard", "gelf"];
pub const GELF_SERVER_TYPES: &[&str] = &["tcp", "udp", "http"];
pub const VERBOSITY_VALUES: &[&str] = &["none", "normal", "verbose", "camouflage"];
pub const DATA_TYPE_SUPPORT: &[&str] = &["authoritative", "hints", "none"];
pub const PROCESSOR_POSITIONS: &[&str] = &["any", "before", "after"];

pub const INPUT_STAGING_TYPES: &[&str] = &[
    "local",
    "s3",
    "abs",
    "none",
    "workspace-snowflake",
    "workspace-redshift",
    "workspace-synapse",
    "workspace-abs",
    "workspace-exasol",
    "workspace-teradata",
    "workspace-bigquery",
];

/// Output staging never goes through s3/abs directly.
pub const OUTPUT_STAGING_TYPES: &[&str] = &[
    "local",
    "none",
    "workspace-snowflake",
    "workspace-redshift",
    "workspace-synapse",
    "workspace-abs",
    "workspace-exasol",
    "workspace-teradata",
    "workspace-bigquery",
];

pub const DEFAULT_MEMORY: &str = "256m";
pub const DEFAULT_PROCESS_TIMEOUT: i64 = 3600;

/// Shape of a component record as the deployment service returns it.
pub struct ComponentSpecificationDefinition;

static TREE: LazyLock<Node> = LazyLock::new(build_tree);

impl Definition for ComponentSpecificationDefinition {
    fn root(&self) -> &'static str {
        "component"
    }

    fn tree(&self) -> &Node {
        &TREE
    }
}

fn default_verbosity() -> Value {
    json!({
        "100": "none",
        "200": "normal",
        "250": "normal",
        "300": "normal",
        "400": "normal",
        "500": "camouflage",
        "550": "camouflage",
        "600": "camouflage",
    })
}

fn memory_is_parseable(value: &Value) -> Result<(), String> {
    match value.as_str() {
        Some(memory) => memory
            .parse::<ByteSize>()
            .map(|_| ())
            .map_err(|e| e.to_string()),
        None => Ok(()),
    }
}

fn build_tree() -> Node {
    let definition = Node::object()
        .required()
        .extra_keys(ExtraKeys::Ignore)
        .child("type", Node::enumeration(IMAGE_TYPES).required())
        .child("uri", Node::non_empty_string().required())
        .child("tag", Node::string().default_value(json!("latest")))
        .child("digest", Node::string())
        .child("repository", Node::any())
        .child("build_options", Node::any());

    let staging_storage = Node::object()
        .add_defaults_if_absent()
        .child(
            "input",
            Node::enumeration(INPUT_STAGING_TYPES).default_value(json!("local")),
        )
        .child(
            "output",
            Node::enumeration(OUTPUT_STAGING_TYPES).default_value(json!("local")),
        );

    let logging = Node::object()
        .add_defaults_if_absent()
        .child(
            "type",
            Node::enumeration(LOGGING_TYPES).default_value(json!("standard")),
        )
        .child(
            "verbosity",
            Node::map(Node::enumeration(VERBOSITY_VALUES)).default_value(default_verbosity()),
        )
        .child(
            "gelf_server_type",
            Node::enumeration(GELF_SERVER_TYPES).default_value(json!("tcp")),
        )
        .child(
            "no_application_errors",
            Node::boolean().default_value(json!(false)),
        );

    let data = Node::object()
        .required()
        .extra_keys(ExtraKeys::Ignore)
        .child("definition", definition)
        .child(
            "memory",
            Node::non_empty_string()
                .default_value(json!(DEFAULT_MEMORY))
                .rule(memory_is_parseable),
        )
        .child(
            "configuration_format",
            Node::enumeration(CONFIGURATION_FORMATS).default_value(json!("json")),
        )
        .child(
            "process_timeout",
            Node::integer()
                .min(0)
                .default_value(json!(DEFAULT_PROCESS_TIMEOUT)),
        )
        .child("forward_token", Node::boolean().default_value(json!(false)))
        .child(
            "forward_token_details",
            Node::boolean().default_value(json!(false)),
        )
        .child("default_bucket", Node::boolean().default_value(json!(false)))
        .child(
            "default_bucket_stage",
            Node::enumeration(DEFAULT_BUCKET_STAGES).default_value(json!("in")),
        )
        .child("staging_storage", staging_storage)
        .child(
            "synchronous_actions",
            Node::list(Node::non_empty_string()).default_value(json!([])),
        )
        .child("image_parameters", Node::any().default_value(json!({})))
        .child(
            "network",
            Node::enumeration(NETWORK_TYPES).default_value(json!("bridge")),
        )
        .child("logging", logging)
        .child("vendor", Node::any());

    Node::object()
        .extra_keys(ExtraKeys::Ignore)
        .child("id", Node::non_empty_string().required())
        .child("data", data)
        .child(
            "features",
            Node::list(Node::string()).default_value(json!([])),
        )
        .child(
            "dataTypesConfiguration",
            Node::object().child("dataTypesSupport", Node::enumeration(DATA_TYPE_SUPPORT)),
        )
        .child(
            "processorConfiguration",
            Node::object().child(
                "allowedProcessorPosition",
                Node::enumeration(PROCESSOR_POSITIONS),
            ),
        )
}

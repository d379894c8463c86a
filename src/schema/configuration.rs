use serde_json::{Map, Value, json};
use std::sync::LazyLock;

use super::component::DATA_TYPE_SUPPORT;
use super::node::{ExtraKeys, Node};
use super::Definition;

pub const TABLE_MODIFICATIONS: &[&str] = &["none", "non-destructive", "all"];
pub const WORKSPACE_CREDENTIALS_TYPES: &[&str] = &["snowflake"];

/// Shape of a single job run's configuration.
pub struct ConfigurationDefinition;

static TREE: LazyLock<Node> = LazyLock::new(build_tree);

impl Definition for ConfigurationDefinition {
    fn root(&self) -> &'static str {
        "configuration"
    }

    fn tree(&self) -> &Node {
        &TREE
    }
}

fn has_any(map: Option<&Map<String, Value>>, keys: &[&str]) -> bool {
    map.is_some_and(|map| {
        keys.iter()
            .any(|key| map.get(*key).is_some_and(|v| !v.is_null() && v != ""))
    })
}

fn filter_of(value: &Value) -> Option<&Map<String, Value>> {
    value.get("filter").and_then(Value::as_object)
}

fn is_enabled(value: &Value) -> bool {
    value.get("enabled").and_then(Value::as_bool).unwrap_or(false)
}

fn runs_filter_required(value: &Value) -> Result<(), String> {
    if is_enabled(value) && !has_any(filter_of(value), &["date_since", "limit"]) {
        return Err("At least one of date_since or limit parameters must be defined.".to_string());
    }
    Ok(())
}

fn custom_filter_required(value: &Value) -> Result<(), String> {
    if is_enabled(value)
        && !has_any(filter_of(value), &["component_id", "config_id", "branch_id"])
    {
        return Err(
            "At least one of component_id, config_id or branch_id parameters must be defined."
                .to_string(),
        );
    }
    Ok(())
}

fn exactly_one_secret(value: &Value) -> Result<(), String> {
    let has = |key: &str| value.get(key).is_some_and(|v| !v.is_null());
    match (has("password"), has("privateKey")) {
        (true, false) | (false, true) => Ok(()),
        _ => Err("Exactly one of \"password\" or \"privateKey\" must be configured.".to_string()),
    }
}

fn is_set(value: &Value, key: &str) -> bool {
    value.get(key).is_some_and(|v| !v.is_null())
}

fn input_table_has_source(value: &Value) -> Result<(), String> {
    if !is_set(value, "source") && !is_set(value, "source_search") {
        return Err("Either \"source\" or \"source_search\" must be configured.".to_string());
    }
    Ok(())
}

fn input_file_has_selector(value: &Value) -> Result<(), String> {
    if ["tags", "query", "source"]
        .iter()
        .all(|key| !is_set(value, key))
    {
        return Err("At least one of \"tags\", \"query\" or \"source\" must be configured.".to_string());
    }
    Ok(())
}

/// Mapping entries are owned by the mapping SDK; only the keys this crate
/// depends on are checked, everything else passes through.
fn input_table() -> Node {
    Node::object()
        .extra_keys(ExtraKeys::Keep)
        .child("source", Node::non_empty_string())
        .child("source_search", Node::any())
        .child("destination", Node::string())
        .rule(input_table_has_source)
}

fn input_file() -> Node {
    Node::object()
        .extra_keys(ExtraKeys::Keep)
        .child("tags", Node::list(Node::string()))
        .child("query", Node::string())
        .child("source", Node::any())
        .rule(input_file_has_selector)
}

fn output_table() -> Node {
    Node::object()
        .extra_keys(ExtraKeys::Keep)
        .child("source", Node::non_empty_string().required())
        .child("destination", Node::string())
}

fn output_file() -> Node {
    Node::object()
        .extra_keys(ExtraKeys::Keep)
        .child("source", Node::non_empty_string().required())
        .child("tags", Node::list(Node::string()))
}

fn processor() -> Node {
    Node::object()
        .child(
            "definition",
            Node::object()
                .required()
                .child("component", Node::non_empty_string().required())
                .child("tag", Node::string()),
        )
        .child("parameters", Node::any())
}

fn storage() -> Node {
    let input = Node::object()
        .add_defaults_if_absent()
        .child("tables", Node::list(input_table()).default_value(json!([])))
        .child("files", Node::list(input_file()).default_value(json!([])))
        .child("read_only_storage_access", Node::boolean());

    let table_files = Node::object()
        .child("tags", Node::list(Node::string()).default_value(json!([])))
        .child("is_permanent", Node::boolean().default_value(json!(true)));

    let output = Node::object()
        .add_defaults_if_absent()
        .child("tables", Node::list(output_table()).default_value(json!([])))
        .child("files", Node::list(output_file()).default_value(json!([])))
        .child("table_files", table_files)
        .child("default_bucket", Node::string())
        .child("data_type_support", Node::enumeration(DATA_TYPE_SUPPORT))
        .child("table_modifications", Node::enumeration(TABLE_MODIFICATIONS))
        .child("treat_values_as_null", Node::list(Node::string()));

    Node::object()
        .add_defaults_if_absent()
        .child("input", input)
        .child("output", output)
}

fn runtime() -> Node {
    let credentials = Node::object()
        .child("id", Node::non_empty_string().required())
        .child(
            "type",
            Node::enumeration(WORKSPACE_CREDENTIALS_TYPES).required(),
        )
        .child("password", Node::non_empty_string())
        .child("privateKey", Node::non_empty_string())
        .rule(exactly_one_secret);

    let backend = Node::object()
        .child("type", Node::string())
        .child("context", Node::string())
        .child("workspace_credentials", credentials);

    Node::object()
        .child("safe", Node::boolean())
        .child("image_tag", Node::string())
        .child("use_file_storage_only", Node::boolean())
        .child("backend", backend)
}

fn artifacts() -> Node {
    let options = Node::object()
        .add_defaults_if_absent()
        .child("zip", Node::boolean().default_value(json!(true)));

    let runs = Node::object()
        .add_defaults_if_absent()
        .child("enabled", Node::boolean().default_value(json!(false)))
        .child(
            "filter",
            Node::object()
                .child("date_since", Node::string())
                .child("limit", Node::integer().min(1)),
        )
        .rule(runs_filter_required);

    let custom = Node::object()
        .add_defaults_if_absent()
        .child("enabled", Node::boolean().default_value(json!(false)))
        .child(
            "filter",
            Node::object()
                .child("component_id", Node::string())
                .child("config_id", Node::string())
                .child("branch_id", Node::string())
                .child("date_since", Node::string())
                .child("limit", Node::integer().min(1)),
        )
        .rule(custom_filter_required);

    let shared = Node::object()
        .add_defaults_if_absent()
        .child("enabled", Node::boolean().default_value(json!(false)));

    Node::object()
        .add_defaults_if_absent()
        .child("options", options)
        .child("runs", runs)
        .child("custom", custom)
        .child("shared", shared)
}

fn build_tree() -> Node {
    Node::object()
        .child("parameters", Node::any().default_value(json!({})))
        .child("storage", storage())
        .child(
            "processors",
            Node::object()
                .add_defaults_if_absent()
                .child("before", Node::list(processor()).default_value(json!([])))
                .child("after", Node::list(processor()).default_value(json!([]))),
        )
        .child("runtime", runtime())
        .child("variables_id", Node::string())
        .child("variables_values_id", Node::string())
        .child("shared_code_id", Node::string())
        .child("shared_code_row_ids", Node::list(Node::string()))
        .child("image_parameters", Node::any().default_value(json!({})))
        .child("authorization", Node::any().default_value(json!({})))
        .child("action", Node::string())
        .child("artifacts", artifacts())
}

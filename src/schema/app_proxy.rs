use serde_json::{Map, Value, json};
use std::collections::HashSet;
use std::sync::LazyLock;

use super::node::Node;
use super::Definition;

pub const AUTH_RULE_TYPES: &[&str] = &["pathPrefix"];

/// Shape of the data-app proxy settings: auth providers plus path rules.
pub struct AppProxyDefinition;

static TREE: LazyLock<Node> = LazyLock::new(build_tree);

impl Definition for AppProxyDefinition {
    fn root(&self) -> &'static str {
        "app_proxy"
    }

    fn tree(&self) -> &Node {
        &TREE
    }
}

/// Empty role/provider lists mean "not set"; drop them so the
/// at-least-one constraint only applies to lists that carry entries.
fn remove_empty_list(map: &mut Map<String, Value>, key: &str) {
    if map
        .get(key)
        .and_then(Value::as_array)
        .is_some_and(Vec::is_empty)
    {
        map.remove(key);
    }
}

fn prune_allowed_roles(map: &mut Map<String, Value>) {
    remove_empty_list(map, "allowed_roles");
}

fn prune_auth(map: &mut Map<String, Value>) {
    remove_empty_list(map, "auth");
}

fn auth_matches_requirement(value: &Value) -> Result<(), String> {
    let required = value
        .get("auth_required")
        .and_then(Value::as_bool)
        .unwrap_or(true);
    let has_auth = value.get("auth").is_some();

    match (required, has_auth) {
        (true, false) => Err("The \"auth\" option must be set when \"auth_required\" is true.".to_string()),
        (false, true) => Err("The \"auth\" option must not be set when \"auth_required\" is false.".to_string()),
        _ => Ok(()),
    }
}

fn auth_references_providers(value: &Value) -> Result<(), String> {
    let providers: HashSet<&str> = value
        .get("auth_providers")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|provider| provider.get("id").and_then(Value::as_str))
        .collect();

    let rules = value
        .get("auth_rules")
        .and_then(Value::as_array)
        .into_iter()
        .flatten();

    for (index, rule) in rules.enumerate() {
        let auth = rule.get("auth").and_then(Value::as_array).into_iter().flatten();
        for provider in auth.filter_map(Value::as_str) {
            if !providers.contains(provider) {
                return Err(format!(
                    "Auth rule {index} references undefined auth provider \"{provider}\"."
                ));
            }
        }
    }

    Ok(())
}

fn build_tree() -> Node {
    let provider = Node::object()
        .child("id", Node::non_empty_string().required())
        .child("type", Node::non_empty_string().required())
        .child("allowed_roles", Node::list(Node::non_empty_string()).min_items(1))
        .prune(prune_allowed_roles);

    let rule = Node::object()
        .child("type", Node::enumeration(AUTH_RULE_TYPES).required())
        .child("value", Node::non_empty_string().required())
        .child("auth_required", Node::boolean().default_value(json!(true)))
        .child("auth", Node::list(Node::non_empty_string()).min_items(1))
        .prune(prune_auth)
        .rule(auth_matches_requirement);

    Node::object()
        .child("auth_providers", Node::list(provider).default_value(json!([])))
        .child("auth_rules", Node::list(rule).default_value(json!([])))
        .rule(auth_references_providers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process(raw: Value) -> Result<Value, crate::schema::ConfigurationInvalid> {
        AppProxyDefinition.process_configuration(&raw)
    }

    #[test]
    fn test_valid_configuration() {
        let normalized = process(json!({
            "auth_providers": [{"id": "oidc", "type": "oidc", "allowed_roles": ["admin"]}],
            "auth_rules": [
                {"type": "pathPrefix", "value": "/", "auth": ["oidc"]},
                {"type": "pathPrefix", "value": "/public", "auth_required": false}
            ]
        }))
        .unwrap();
        assert_eq!(normalized["auth_rules"][0]["auth_required"], json!(true));
        assert!(normalized["auth_rules"][1].get("auth").is_none());
    }

    #[test]
    fn test_empty_lists_are_removed() {
        let normalized = process(json!({
            "auth_providers": [{"id": "oidc", "type": "oidc", "allowed_roles": []}],
            "auth_rules": [{"type": "pathPrefix", "value": "/", "auth_required": false, "auth": []}]
        }))
        .unwrap();
        assert!(normalized["auth_providers"][0].get("allowed_roles").is_none());
        assert!(normalized["auth_rules"][0].get("auth").is_none());
    }

    #[test]
    fn test_auth_required_without_auth() {
        let err = process(json!({
            "auth_rules": [{"type": "pathPrefix", "value": "/", "auth": []}]
        }))
        .unwrap_err();
        assert_eq!(err.path, "app_proxy.auth_rules.0");
    }

    #[test]
    fn test_auth_set_while_not_required() {
        let err = process(json!({
            "auth_providers": [{"id": "oidc", "type": "oidc"}],
            "auth_rules": [{"type": "pathPrefix", "value": "/", "auth_required": false, "auth": ["oidc"]}]
        }))
        .unwrap_err();
        assert!(err.reason.contains("must not be set"));
    }

    #[test]
    fn test_undefined_provider_reference() {
        let err = process(json!({
            "auth_providers": [{"id": "oidc", "type": "oidc"}],
            "auth_rules": [{"type": "pathPrefix", "value": "/", "auth": ["simpleAuth"]}]
        }))
        .unwrap_err();
        assert_eq!(err.path, "app_proxy");
        assert!(err.reason.contains("\"simpleAuth\""));
    }
}

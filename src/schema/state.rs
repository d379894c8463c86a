use serde_json::json;
use std::sync::LazyLock;

use super::node::Node;
use super::Definition;

/// Shape of the persisted per-component state document.
pub struct StateDefinition;

static TREE: LazyLock<Node> = LazyLock::new(build_tree);

impl Definition for StateDefinition {
    fn root(&self) -> &'static str {
        "state"
    }

    fn tree(&self) -> &Node {
        &TREE
    }
}

fn build_tree() -> Node {
    let table = Node::object()
        .child("source", Node::non_empty_string().required())
        .child("lastImportDate", Node::non_empty_string().required());

    let file = Node::object()
        .child(
            "tags",
            Node::list(Node::object().child("name", Node::non_empty_string().required()))
                .required(),
        )
        .child("lastImportId", Node::integer().required());

    let input = Node::object()
        .add_defaults_if_absent()
        .child("tables", Node::list(table).default_value(json!([])))
        .child("files", Node::list(file).default_value(json!([])));

    Node::object()
        .child("component", Node::any().default_value(json!({})))
        .child(
            "storage",
            Node::object().add_defaults_if_absent().child("input", input),
        )
}

//! Schema tree nodes and the single normalizer that evaluates them.

use serde_json::{Map, Value};

use super::error::ConfigurationInvalid;

/// Cross-field check run against the normalized value of a node.
pub type Rule = fn(&Value) -> Result<(), String>;

/// Pruning pass applied to an object's raw keys before its children are normalized.
pub type Prune = fn(&mut Map<String, Value>);

/// What an object node does with keys it does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraKeys {
    Reject,
    Ignore,
    Keep,
}

#[derive(Debug)]
pub enum NodeKind {
    /// Opaque payload, passed through untouched.
    Any,
    /// Any JSON scalar including null.
    Scalar,
    String {
        allow_empty: bool,
    },
    Integer {
        min: Option<i64>,
    },
    Boolean,
    Enum(&'static [&'static str]),
    List {
        prototype: Box<Node>,
        min_items: usize,
    },
    /// String-keyed map whose values all share one prototype.
    Map(Box<Node>),
    Object {
        children: Vec<(&'static str, Node)>,
        extra_keys: ExtraKeys,
        add_defaults: bool,
    },
}

/// One node of a declarative schema tree.
///
/// Trees are assembled with the builder methods and evaluated by
/// [`Node::process`], which returns the normalized document (defaults filled)
/// or the first violation found.
#[derive(Debug)]
pub struct Node {
    kind: NodeKind,
    required: bool,
    default: Option<Value>,
    rules: Vec<Rule>,
    prune: Vec<Prune>,
}

impl Node {
    fn of(kind: NodeKind) -> Self {
        Self {
            kind,
            required: false,
            default: None,
            rules: Vec::new(),
            prune: Vec::new(),
        }
    }

    pub fn any() -> Self {
        Self::of(NodeKind::Any)
    }

    pub fn scalar() -> Self {
        Self::of(NodeKind::Scalar)
    }

    pub fn string() -> Self {
        Self::of(NodeKind::String { allow_empty: true })
    }

    pub fn non_empty_string() -> Self {
        Self::of(NodeKind::String { allow_empty: false })
    }

    pub fn integer() -> Self {
        Self::of(NodeKind::Integer { min: None })
    }

    pub fn boolean() -> Self {
        Self::of(NodeKind::Boolean)
    }

    pub fn enumeration(values: &'static [&'static str]) -> Self {
        Self::of(NodeKind::Enum(values))
    }

    pub fn list(prototype: Node) -> Self {
        Self::of(NodeKind::List {
            prototype: Box::new(prototype),
            min_items: 0,
        })
    }

    pub fn map(prototype: Node) -> Self {
        Self::of(NodeKind::Map(Box::new(prototype)))
    }

    pub fn object() -> Self {
        Self::of(NodeKind::Object {
            children: Vec::new(),
            extra_keys: ExtraKeys::Reject,
            add_defaults: false,
        })
    }

    pub fn child(mut self, name: &'static str, node: Node) -> Self {
        match &mut self.kind {
            NodeKind::Object { children, .. } => children.push((name, node)),
            other => debug_assert!(false, "child() on non-object node {other:?}"),
        }
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn min(mut self, value: i64) -> Self {
        if let NodeKind::Integer { min } = &mut self.kind {
            *min = Some(value);
        }
        self
    }

    pub fn min_items(mut self, count: usize) -> Self {
        if let NodeKind::List { min_items, .. } = &mut self.kind {
            *min_items = count;
        }
        self
    }

    /// Materialize this object from its children's defaults when the key is absent.
    pub fn add_defaults_if_absent(mut self) -> Self {
        if let NodeKind::Object { add_defaults, .. } = &mut self.kind {
            *add_defaults = true;
        }
        self
    }

    pub fn extra_keys(mut self, policy: ExtraKeys) -> Self {
        if let NodeKind::Object { extra_keys, .. } = &mut self.kind {
            *extra_keys = policy;
        }
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn prune(mut self, prune: Prune) -> Self {
        self.prune.push(prune);
        self
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Normalize `value` against this tree, rooted at `root` for error paths.
    pub fn process(&self, root: &str, value: &Value) -> Result<Value, ConfigurationInvalid> {
        if value.is_null() {
            if let Some(empty) = self.empty_container() {
                return self.normalize(&empty, root);
            }
        }
        self.normalize(value, root)
    }

    fn empty_container(&self) -> Option<Value> {
        match self.kind {
            NodeKind::Object { .. } | NodeKind::Map(_) => Some(Value::Object(Map::new())),
            NodeKind::List { .. } => Some(Value::Array(Vec::new())),
            _ => None,
        }
    }

    fn accepts_null(&self) -> bool {
        !self.required
            && self.default.is_none()
            && matches!(
                self.kind,
                NodeKind::Any | NodeKind::Scalar | NodeKind::String { .. }
            )
    }

    fn normalize(&self, value: &Value, path: &str) -> Result<Value, ConfigurationInvalid> {
        let normalized = match &self.kind {
            NodeKind::Any => value.clone(),
            NodeKind::Scalar => {
                if value.is_array() || value.is_object() {
                    return Err(invalid_type(path, "scalar", value));
                }
                value.clone()
            }
            NodeKind::String { allow_empty } => match value {
                Value::Null => Value::Null,
                Value::String(text) => {
                    if !allow_empty && text.trim().is_empty() {
                        return Err(ConfigurationInvalid::new(
                            path,
                            "The path cannot contain an empty value, but got \"\".",
                        ));
                    }
                    value.clone()
                }
                other => return Err(invalid_type(path, "string", other)),
            },
            NodeKind::Integer { min } => {
                let Some(number) = value.as_i64() else {
                    return Err(invalid_type(path, "int", value));
                };
                if let Some(min) = min {
                    if number < *min {
                        return Err(ConfigurationInvalid::new(
                            path,
                            format!(
                                "The value {number} is too small. Should be greater than or equal to {min}"
                            ),
                        ));
                    }
                }
                value.clone()
            }
            NodeKind::Boolean => {
                if !value.is_boolean() {
                    return Err(invalid_type(path, "bool", value));
                }
                value.clone()
            }
            NodeKind::Enum(allowed) => match value.as_str() {
                Some(text) if allowed.contains(&text) => value.clone(),
                _ => {
                    let permissible = allowed
                        .iter()
                        .map(|v| format!("\"{v}\""))
                        .collect::<Vec<_>>()
                        .join(", ");
                    return Err(ConfigurationInvalid::new(
                        path,
                        format!("The value {value} is not allowed. Permissible values: {permissible}"),
                    ));
                }
            },
            NodeKind::List {
                prototype,
                min_items,
            } => {
                let Value::Array(items) = value else {
                    return Err(invalid_type(path, "array", value));
                };
                if items.len() < *min_items {
                    return Err(ConfigurationInvalid::new(
                        path,
                        format!("The path should have at least {min_items} element(s) defined."),
                    ));
                }
                let mut output = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    output.push(prototype.normalize(item, &format!("{path}.{index}"))?);
                }
                Value::Array(output)
            }
            NodeKind::Map(prototype) => {
                let Value::Object(entries) = value else {
                    return Err(invalid_type(path, "object", value));
                };
                let mut output = Map::new();
                for (key, entry) in entries {
                    output.insert(
                        key.clone(),
                        prototype.normalize(entry, &format!("{path}.{key}"))?,
                    );
                }
                Value::Object(output)
            }
            NodeKind::Object {
                children,
                extra_keys,
                ..
            } => {
                let Value::Object(input) = value else {
                    return Err(invalid_type(path, "object", value));
                };
                let mut input = input.clone();
                for prune in &self.prune {
                    prune(&mut input);
                }
                normalize_object(children, *extra_keys, input, path)?
            }
        };

        for rule in &self.rules {
            rule(&normalized).map_err(|reason| ConfigurationInvalid::new(path, reason))?;
        }

        Ok(normalized)
    }

    /// Value used when the key is missing (or null) in the parent object.
    fn absent_value(&self, path: &str) -> Result<Option<Value>, ConfigurationInvalid> {
        if let Some(default) = &self.default {
            return Ok(Some(default.clone()));
        }
        if self.required {
            return Ok(None);
        }
        match self.kind {
            NodeKind::Object {
                add_defaults: true, ..
            } => Ok(Some(self.normalize(&Value::Object(Map::new()), path)?)),
            _ => Ok(None),
        }
    }
}

fn normalize_object(
    children: &[(&'static str, Node)],
    extra_keys: ExtraKeys,
    mut input: Map<String, Value>,
    path: &str,
) -> Result<Value, ConfigurationInvalid> {
    let mut output = Map::new();

    for (name, child) in children {
        let child_path = format!("{path}.{name}");
        match input.remove(*name) {
            Some(Value::Null) if child.required && child.default.is_none() => {
                return Err(ConfigurationInvalid::new(
                    child_path,
                    format!("The child config \"{name}\" under \"{path}\" must be configured, but got null."),
                ));
            }
            Some(value) if !value.is_null() || child.accepts_null() => {
                output.insert((*name).to_string(), child.normalize(&value, &child_path)?);
            }
            _ => match child.absent_value(&child_path)? {
                Some(value) => {
                    output.insert((*name).to_string(), value);
                }
                None if child.required => {
                    return Err(ConfigurationInvalid::new(
                        path,
                        format!("The child config \"{name}\" under \"{path}\" must be configured."),
                    ));
                }
                None => {}
            },
        }
    }

    if let Some(key) = input.keys().next() {
        match extra_keys {
            ExtraKeys::Reject => {
                let available = children
                    .iter()
                    .map(|(name, _)| format!("\"{name}\""))
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(ConfigurationInvalid::new(
                    path,
                    format!(
                        "Unrecognized option \"{key}\" under \"{path}\". Available options are {available}."
                    ),
                ));
            }
            ExtraKeys::Ignore => {}
            ExtraKeys::Keep => output.extend(input),
        }
    }

    Ok(Value::Object(output))
}

fn invalid_type(path: &str, expected: &str, actual: &Value) -> ConfigurationInvalid {
    ConfigurationInvalid::new(
        path,
        format!(
            "Invalid type. Expected \"{expected}\", but got \"{}\".",
            type_name(actual)
        ),
    )
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

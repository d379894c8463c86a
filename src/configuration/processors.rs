use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorImage {
    pub component: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// A processor component run before or after the main container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorDefinition {
    pub definition: ProcessorImage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

impl ProcessorDefinition {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            definition: ProcessorImage {
                component: component.into(),
                tag: None,
            },
            parameters: None,
        }
    }

    pub fn component(&self) -> &str {
        &self.definition.component
    }

    pub fn tag(&self) -> Option<&str> {
        self.definition.tag.as_deref()
    }
}

/// Serializes to `{}` when both lists are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Processors {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub before: Vec<ProcessorDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<ProcessorDefinition>,
}

impl Processors {
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_processors_serialize_to_empty_object() {
        assert_eq!(serde_json::to_value(Processors::default()).unwrap(), json!({}));
    }

    #[test]
    fn test_processors_keep_order() {
        let processors: Processors = serde_json::from_value(json!({
            "before": [
                {"definition": {"component": "keboola.processor-first"}},
                {"definition": {"component": "keboola.processor-second", "tag": "1.0.0"}, "parameters": {"a": 1}}
            ]
        }))
        .unwrap();

        assert_eq!(processors.before.len(), 2);
        assert_eq!(processors.before[0].component(), "keboola.processor-first");
        assert_eq!(processors.before[1].tag(), Some("1.0.0"));
        assert!(processors.after.is_empty());
        assert_eq!(
            serde_json::to_value(&processors).unwrap()["before"][1]["parameters"],
            json!({"a": 1})
        );
    }
}

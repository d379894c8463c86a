use std::collections::BTreeMap;

const CREATED_BY: &str = "KBC.createdBy";
const LAST_UPDATED_BY: &str = "KBC.lastUpdatedBy";

/// Provenance attached to every table and file a job writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemMetadata {
    pub component_id: String,
    pub configuration_id: Option<String>,
    pub configuration_row_id: Option<String>,
    /// Only set when writing into a development branch.
    pub branch_id: Option<String>,
    /// Files carry the run id, tables do not.
    pub run_id: Option<String>,
}

impl SystemMetadata {
    /// Metadata for objects the job creates.
    pub fn created_by(&self) -> BTreeMap<String, String> {
        self.render(CREATED_BY)
    }

    /// Metadata for existing objects the job rewrites.
    pub fn last_updated_by(&self) -> BTreeMap<String, String> {
        self.render(LAST_UPDATED_BY)
    }

    pub fn without_run_id(&self) -> Self {
        Self {
            run_id: None,
            ..self.clone()
        }
    }

    fn render(&self, prefix: &str) -> BTreeMap<String, String> {
        let entries = [
            ("component.id", Some(&self.component_id)),
            ("configuration.id", self.configuration_id.as_ref()),
            ("configurationRow.id", self.configuration_row_id.as_ref()),
            ("branch.id", self.branch_id.as_ref()),
        ];

        entries
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (format!("{prefix}.{key}"), v.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_created_by_skips_unset_ids() {
        let metadata = SystemMetadata {
            component_id: "keboola.ex-db-snowflake".to_string(),
            configuration_id: Some("123".to_string()),
            ..SystemMetadata::default()
        };

        let rendered = metadata.created_by();
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered["KBC.createdBy.component.id"], "keboola.ex-db-snowflake");
        assert_eq!(rendered["KBC.createdBy.configuration.id"], "123");
    }

    #[test]
    fn test_last_updated_by_with_row_and_branch() {
        let metadata = SystemMetadata {
            component_id: "keboola.wr-db".to_string(),
            configuration_id: Some("1".to_string()),
            configuration_row_id: Some("2".to_string()),
            branch_id: Some("3".to_string()),
            run_id: Some("4".to_string()),
        };

        let rendered = metadata.last_updated_by();
        assert_eq!(
            rendered.keys().map(String::as_str).collect::<Vec<_>>(),
            [
                "KBC.lastUpdatedBy.branch.id",
                "KBC.lastUpdatedBy.component.id",
                "KBC.lastUpdatedBy.configuration.id",
                "KBC.lastUpdatedBy.configurationRow.id",
            ]
        );
        assert_eq!(metadata.without_run_id().run_id, None);
    }
}

mod common;

use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::sync::Arc;

use common::{FakeReader, FakeWorkspaceApi, FakeWriter, WriterCall, component, configuration, shared};
use jobqueue_staging::JobError;
use jobqueue_staging::client::{JobStorageApiClientOptions, StorageSession};
use jobqueue_staging::configuration::Configuration;
use jobqueue_staging::loader::{
    InputDataLoaderFactory, OutputDataLoader, OutputDataLoaderFactory, StagingStrategy,
};
use jobqueue_staging::mapping::MappingError;
use jobqueue_staging::specification::{ComponentSpecification, DataTypeSupport};
use jobqueue_staging::state::State;
use jobqueue_staging::workspace::WorkspaceProviderFactory;

async fn strategy(component: &ComponentSpecification, configuration: &Configuration) -> Arc<StagingStrategy> {
    let factory = WorkspaceProviderFactory::new(
        shared(FakeWorkspaceApi::default()),
        component,
        configuration,
        Some("123".to_string()),
    );
    shared(StagingStrategy::new(component, &factory, "/data").await.unwrap())
}

fn session(native_types: bool, dev_branch: Option<&str>) -> StorageSession {
    let features: BTreeSet<String> = if native_types {
        BTreeSet::from(["new-native-types".to_string()])
    } else {
        BTreeSet::new()
    };
    StorageSession::builder()
        .project_features(features)
        .maybe_branch_id(dev_branch)
        .is_default_branch(dev_branch.is_none())
        .build()
}

async fn output_loader(
    writer: Arc<FakeWriter>,
    component: ComponentSpecification,
    raw_configuration: Value,
    session: StorageSession,
    config_id: Option<&str>,
) -> OutputDataLoader {
    let configuration = configuration(raw_configuration);
    let strategy = strategy(&component, &configuration).await;
    let options = JobStorageApiClientOptions::builder().run_id("987").build();
    OutputDataLoaderFactory::new(writer, session, options).create(
        shared(component),
        shared(configuration),
        strategy,
        config_id.map(String::from),
        None,
    )
}

#[tokio::test]
async fn test_empty_input_downloads_nothing() {
    let reader = shared(FakeReader::default());
    let component = component(json!({}), &[]);
    let configuration = configuration(json!({}));
    let strategy = strategy(&component, &configuration).await;

    let loader = InputDataLoaderFactory::new(reader.clone()).create(
        shared(component),
        shared(configuration),
        shared(State::default()),
        strategy,
    );
    let result = loader.load_input_data().await.unwrap();

    assert_eq!(reader.download_count(), 0);
    assert!(result.input_table_result.is_empty());
    assert!(result.input_file_state_list.is_empty());
}

#[tokio::test]
async fn test_input_tables_and_files_are_downloaded() {
    let reader = shared(FakeReader::default());
    let component = component(json!({}), &[]);
    let configuration = configuration(json!({
        "storage": {"input": {
            "tables": [{"source": "in.c-main.orders", "destination": "orders.csv"}],
            "files": [{"tags": ["invoices"]}],
        }}
    }));
    let state = State::from_value(&json!({
        "storage": {"input": {
            "tables": [{"source": "in.c-main.orders", "lastImportDate": "2024-05-01T00:00:00+0000"}],
            "files": [{"tags": [{"name": "invoices"}], "lastImportId": 17}],
        }}
    }))
    .unwrap();
    let strategy = strategy(&component, &configuration).await;

    let loader = InputDataLoaderFactory::new(reader.clone()).create(
        shared(component),
        shared(configuration),
        shared(state),
        strategy,
    );
    let result = loader.load_input_data().await.unwrap();

    let table_calls = reader.table_calls.lock().unwrap().clone();
    assert_eq!(table_calls.len(), 1);
    assert_eq!(table_calls[0].sources, ["in.c-main.orders"]);
    assert_eq!(table_calls[0].destination, "in/tables");
    assert_eq!(table_calls[0].state_len, 1);
    assert!(table_calls[0].options.dev_inputs_disabled);
    assert!(!table_calls[0].options.preserve_workspace);
    assert_eq!(*reader.file_calls.lock().unwrap(), ["in/files"]);

    assert_eq!(result.input_table_result.tables.len(), 1);
    assert_eq!(result.input_file_state_list.0[0].last_import_id, 17);
}

#[tokio::test]
async fn test_branch_mapping_feature_enables_dev_inputs() {
    let reader = shared(FakeReader::default());
    let component = component(json!({}), &["dev-mapping-allowed"]);
    let configuration = configuration(json!({
        "storage": {"input": {"tables": [{"source": "in.c-main.orders"}]}}
    }));
    let strategy = strategy(&component, &configuration).await;

    InputDataLoaderFactory::new(reader.clone())
        .create(shared(component), shared(configuration), shared(State::default()), strategy)
        .load_input_data()
        .await
        .unwrap();

    assert!(!reader.table_calls.lock().unwrap()[0].options.dev_inputs_disabled);
}

#[tokio::test]
async fn test_storage_client_error_becomes_user_error() {
    let reader = shared(FakeReader::failing(MappingError::Client {
        status: Some(404),
        message: "The table \"orders\" was not found in the bucket \"in.c-main\"".to_string(),
    }));
    let component = component(json!({}), &[]);
    let configuration = configuration(json!({
        "storage": {"input": {"tables": [{"source": "in.c-main.orders"}]}}
    }));
    let strategy = strategy(&component, &configuration).await;

    let err = InputDataLoaderFactory::new(reader)
        .create(shared(component), shared(configuration), shared(State::default()), strategy)
        .load_input_data()
        .await
        .unwrap_err();

    assert!(err.is_user_error());
    assert_eq!(
        err.to_string(),
        "Cannot import data from Storage API: The table \"orders\" was not found in the bucket \"in.c-main\""
    );
}

#[tokio::test]
async fn test_output_files_are_uploaded_before_tables() {
    let writer = shared(FakeWriter::default());
    let loader = output_loader(
        writer.clone(),
        component(json!({}), &[]),
        json!({
            "storage": {
                "input": {"files": [{"tags": ["invoices"]}]},
                "output": {
                    "tables": [{"source": "result.csv", "destination": "out.c-main.result"}],
                    "treat_values_as_null": ["NA"],
                    "table_modifications": "non-destructive",
                }
            }
        }),
        session(false, None),
        Some("123"),
    )
    .await;

    let queue = loader.store_output(false).await.unwrap().unwrap();
    assert_eq!(queue.task_count(), 1);
    queue.wait_for_all().await.unwrap();

    let calls = writer.calls();
    assert_eq!(calls.len(), 3);
    let WriterCall::Files { source, is_failed_job, metadata } = &calls[0] else {
        panic!("files must be uploaded first, got {:?}", calls[0]);
    };
    assert_eq!(source, "out/files");
    assert!(!is_failed_job);
    assert_eq!(metadata.run_id.as_deref(), Some("987"));
    assert_eq!(metadata.configuration_id.as_deref(), Some("123"));

    let WriterCall::Tables { source, default_bucket, settings, metadata } = &calls[1] else {
        panic!("tables must follow files, got {:?}", calls[1]);
    };
    assert_eq!(source, "out/tables");
    assert_eq!(default_bucket, &None);
    assert_eq!(settings.treat_values_as_null, Some(vec!["NA".to_string()]));
    assert_eq!(settings.data_type_support, DataTypeSupport::None);
    assert!(metadata.run_id.is_none());
    assert!(metadata.branch_id.is_none());

    assert_eq!(calls[2], WriterCall::TagInputFiles(1));
}

#[tokio::test]
async fn test_failed_job_skips_input_file_tagging() {
    let writer = shared(FakeWriter::default());
    let loader = output_loader(
        writer.clone(),
        component(json!({}), &[]),
        json!({"storage": {"input": {"files": [{"tags": ["invoices"]}]}}}),
        session(false, None),
        Some("123"),
    )
    .await;

    assert!(loader.store_output(true).await.unwrap().is_some());

    let calls = writer.calls();
    assert!(matches!(calls[0], WriterCall::Files { is_failed_job: true, .. }));
    assert!(!calls.iter().any(|call| matches!(call, WriterCall::TagInputFiles(_))));
}

#[tokio::test]
async fn test_component_default_bucket_uses_configuration_id() {
    let writer = shared(FakeWriter::default());
    let loader = output_loader(
        writer.clone(),
        component(json!({"default_bucket": true, "default_bucket_stage": "out"}), &[]),
        json!({}),
        session(false, Some("42")),
        Some("123"),
    )
    .await;

    assert_eq!(
        loader.default_bucket().unwrap().as_deref(),
        Some("out.c-keboola-ex-generic-123")
    );
    loader.store_output(false).await.unwrap();

    let calls = writer.calls();
    let WriterCall::Tables { default_bucket, metadata, .. } = &calls[1] else {
        panic!("expected table upload, got {:?}", calls[1]);
    };
    assert_eq!(default_bucket.as_deref(), Some("out.c-keboola-ex-generic-123"));
    assert_eq!(metadata.branch_id.as_deref(), Some("42"));
}

#[tokio::test]
async fn test_explicit_default_bucket_wins() {
    let loader = output_loader(
        shared(FakeWriter::default()),
        component(json!({"default_bucket": true}), &[]),
        json!({"storage": {"output": {"default_bucket": "in.c-explicit"}}}),
        session(false, None),
        None,
    )
    .await;

    assert_eq!(loader.default_bucket().unwrap().as_deref(), Some("in.c-explicit"));
}

#[tokio::test]
async fn test_default_bucket_without_configuration_id_fails() {
    let writer = shared(FakeWriter::default());
    let loader = output_loader(
        writer.clone(),
        component(json!({"default_bucket": true}), &[]),
        json!({}),
        session(false, None),
        None,
    )
    .await;

    let err = loader.store_output(false).await.unwrap_err();
    assert!(matches!(err, JobError::User(_)));
    assert_eq!(
        err.to_string(),
        "Configuration ID not set, but is required for default_bucket option."
    );
    assert!(writer.calls().is_empty());
}

#[tokio::test]
async fn test_file_storage_only_uploads_tables_as_files() {
    let writer = shared(FakeWriter::default());
    let loader = output_loader(
        writer.clone(),
        component(json!({}), &["allow-use-file-storage-only"]),
        json!({
            "storage": {
                "input": {"files": [{"tags": ["invoices"]}]},
                "output": {
                    "tables": [{"source": "result.csv"}],
                    "table_files": {"tags": ["archive"]},
                },
            },
            "runtime": {"use_file_storage_only": true},
        }),
        session(true, None),
        Some("123"),
    )
    .await;

    assert!(loader.store_output(false).await.unwrap().is_none());
    assert_eq!(
        writer.calls()[1..],
        [
            WriterCall::TableFiles {
                source: "out/tables".to_string(),
                tags: vec!["archive".to_string()],
            },
            WriterCall::TagInputFiles(1),
        ]
    );
}

#[tokio::test]
async fn test_file_storage_only_needs_component_feature() {
    let writer = shared(FakeWriter::default());
    let loader = output_loader(
        writer.clone(),
        component(json!({}), &[]),
        json!({"runtime": {"use_file_storage_only": true}}),
        session(false, None),
        Some("123"),
    )
    .await;

    assert!(loader.store_output(false).await.unwrap().is_some());
    assert!(matches!(writer.calls()[1], WriterCall::Tables { .. }));
}

#[tokio::test]
async fn test_invalid_output_becomes_user_error() {
    let writer = shared(FakeWriter::default());
    *writer.fail_tables_with.lock().unwrap() = Some(MappingError::InvalidOutput(
        "Table sources not found: \"missing.csv\"".to_string(),
    ));
    let loader = output_loader(
        writer,
        component(json!({}), &[]),
        json!({"storage": {"output": {"tables": [{"source": "missing.csv"}]}}}),
        session(false, None),
        Some("123"),
    )
    .await;

    let err = loader.store_output(false).await.unwrap_err();
    assert!(err.is_user_error());
    assert_eq!(err.to_string(), "Table sources not found: \"missing.csv\"");
}

#[tokio::test]
async fn test_data_type_support_precedence() {
    let plain = || component(json!({}), &[]);
    let raw_component = json!({
        "id": "keboola.ex-generic",
        "data": {"definition": {"type": "aws-ecr", "uri": "repo/ex-generic"}},
        "dataTypesConfiguration": {"dataTypesSupport": "hints"},
    });
    let hinting = || ComponentSpecification::new(raw_component.clone()).unwrap();
    let override_config = json!({"storage": {"output": {"data_type_support": "authoritative"}}});

    let cases = [
        (hinting(), override_config.clone(), false, DataTypeSupport::None),
        (hinting(), override_config.clone(), true, DataTypeSupport::Authoritative),
        (hinting(), json!({}), true, DataTypeSupport::Hints),
        (plain(), json!({}), true, DataTypeSupport::None),
    ];

    for (component, raw_configuration, native_types, expected) in cases {
        let loader = output_loader(
            shared(FakeWriter::default()),
            component,
            raw_configuration,
            session(native_types, None),
            Some("123"),
        )
        .await;
        assert_eq!(loader.data_type_support(), expected);
    }
}

#[tokio::test]
async fn test_requested_backend_is_applied_to_client_options() {
    let loader = output_loader(
        shared(FakeWriter::default()),
        component(json!({}), &[]),
        json!({"runtime": {"backend": {"type": "large", "context": "wml"}}}),
        session(false, None),
        Some("123"),
    )
    .await;

    let options = loader.client_options();
    assert_eq!(options.backend_size.as_deref(), Some("large"));
    assert_eq!(options.backend_context.as_deref(), Some("wml"));
    assert_eq!(options.run_id.as_deref(), Some("987"));
}

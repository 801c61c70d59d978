//! Tests for the status CLI command

use std::sync::Arc;

use crate::cli::test_helpers::{create_cli_test_services, create_test_corpus, ingest_args};
use warcdex::cli::commands::ingest;
use warcdex::cli::commands::status::{execute, StatusArgs};
use warcdex::cli::OutputFormat;
use warcdex::{IndexBackend, Services};

/// Test status before anything was ingested
#[tokio::test]
async fn test_status_fresh() {
    let corpus = create_test_corpus();
    let (services, _state) = create_cli_test_services(&corpus);

    for format in [OutputFormat::Human, OutputFormat::Json] {
        let result = execute(StatusArgs { index: None }, &services, format).await;
        assert!(result.is_ok(), "Status should succeed: {:?}", result.err());
    }
}

/// Test status after an ingest
#[tokio::test]
async fn test_status_after_ingest() {
    let corpus = create_test_corpus();
    let (services, _state) = create_cli_test_services(&corpus);

    ingest::execute(ingest_args(), &services, OutputFormat::Json)
        .await
        .unwrap();

    for format in [OutputFormat::Human, OutputFormat::Json] {
        let result = execute(StatusArgs { index: None }, &services, format).await;
        assert!(result.is_ok(), "Status should succeed: {:?}", result.err());
    }
}

/// Test status for an index that does not exist
#[tokio::test]
async fn test_status_unknown_index() {
    let corpus = create_test_corpus();
    let (services, _state) = create_cli_test_services(&corpus);

    let args = StatusArgs {
        index: Some("missing".to_string()),
    };
    assert!(execute(args, &services, OutputFormat::Human).await.is_ok());
}

/// Test status from a second process view while a writer holds the index
#[tokio::test]
async fn test_status_while_index_is_being_written() {
    let corpus = create_test_corpus();
    let (services, _state) = create_cli_test_services(&corpus);
    ingest::execute(ingest_args(), &services, OutputFormat::Json)
        .await
        .unwrap();

    // `services` keeps its writer open; a fresh instance stands in for `warcdex status`
    let observer = Arc::new(Services::new((*services.config).clone()));
    let result = execute(StatusArgs { index: None }, &observer, OutputFormat::Json).await;

    assert!(result.is_ok(), "Status should succeed: {:?}", result.err());
    assert_eq!(observer.backend.document_count("clueweb12").unwrap(), 3);
}

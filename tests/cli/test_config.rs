//! Tests for the show-config CLI command

use crate::cli::test_helpers::{create_cli_test_services, create_test_corpus};
use warcdex::cli::commands::config::{execute, ConfigArgs};
use warcdex::cli::OutputFormat;

/// Test showing configuration (human format)
#[tokio::test]
async fn test_show_config_human() {
    let corpus = create_test_corpus();
    let (services, _state) = create_cli_test_services(&corpus);

    let result = execute(ConfigArgs { all: false }, &services, OutputFormat::Human).await;
    assert!(result.is_ok(), "Show config should succeed");
}

/// Test showing configuration with directories (JSON format)
#[tokio::test]
async fn test_show_config_all_json() {
    let corpus = create_test_corpus();
    let (services, _state) = create_cli_test_services(&corpus);

    let result = execute(ConfigArgs { all: true }, &services, OutputFormat::Json).await;
    assert!(result.is_ok(), "Show config (JSON) should succeed");
}

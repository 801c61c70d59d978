//! File-level and fatal failures

use std::sync::Arc;

use crate::common::{test_config, RecordingBackend, TestCorpus, WarcRecord};
use tempfile::TempDir;
use warcdex::core::error::WarcdexError;
use warcdex::core::ingest::{ledger_key, Orchestrator, ProgressLedger};

fn page(id: &str) -> WarcRecord {
    WarcRecord::new(id, "http://example.org/").html("<p>text</p>")
}

#[test]
fn test_corrupt_archive_is_retried_next_run() {
    let corpus = TestCorpus::new();
    let good = corpus.add_archive("ClueWeb12_00/a/good.warc.gz", &[page("g1")]);
    let bad = corpus.add_raw("ClueWeb12_00/a/bad.warc.gz", b"\x1f\x8b\x08\x00broken");
    let state = TempDir::new().unwrap();
    let config = Arc::new(test_config(corpus.root(), state.path()));
    let backend = Arc::new(RecordingBackend::new());

    let stats = Orchestrator::new(Arc::clone(&config), backend.clone())
        .run()
        .unwrap();

    assert_eq!(stats.files_completed, 1);
    assert_eq!(stats.files_failed, 1);
    let ledger = ProgressLedger::open(&config.ingest.progress_file).unwrap();
    assert!(ledger.contains(&ledger_key(&good)));
    assert!(!ledger.contains(&ledger_key(&bad)));

    // A second run only retries the bad file
    let again = Orchestrator::new(Arc::clone(&config), backend.clone())
        .run()
        .unwrap();
    assert_eq!(again.files_already_done, 1);
    assert_eq!(again.files_failed, 1);
}

#[test]
fn test_missing_required_progress_file_is_fatal() {
    let corpus = TestCorpus::new();
    corpus.add_archive("ClueWeb12_00/a/a.warc.gz", &[page("a1")]);
    let state = TempDir::new().unwrap();
    let mut config = test_config(corpus.root(), state.path());
    config.ingest.require_progress_file = true;
    let backend = Arc::new(RecordingBackend::new());

    let err = Orchestrator::new(Arc::new(config), backend.clone())
        .run()
        .unwrap_err();

    assert!(err.is_fatal());
    assert!(backend.ensure_calls.lock().unwrap().is_empty());
    assert_eq!(backend.bulk_call_count(), 0);
}

#[test]
fn test_storage_failure_stops_the_run() {
    let corpus = TestCorpus::new();
    let archive = corpus.add_archive("ClueWeb12_00/a/a.warc.gz", &[page("a1")]);
    let state = TempDir::new().unwrap();
    let config = Arc::new(test_config(corpus.root(), state.path()));
    let backend = Arc::new(RecordingBackend::failing("disk full"));

    let err = Orchestrator::new(Arc::clone(&config), backend)
        .run()
        .unwrap_err();

    assert!(matches!(err, WarcdexError::StorageError(_)));
    // The skip report is still flushed and nothing was marked done
    assert!(config.ingest.skip_file.exists());
    let ledger = ProgressLedger::open(&config.ingest.progress_file).unwrap();
    assert!(!ledger.contains(&ledger_key(&archive)));
}

#[test]
fn test_storage_failure_survives_unwritable_skip_report() {
    let corpus = TestCorpus::new();
    corpus.add_archive("ClueWeb12_00/a/a.warc.gz", &[page("a1")]);
    let state = TempDir::new().unwrap();
    let mut config = test_config(corpus.root(), state.path());
    // A regular file where the report's parent directory should be
    let blocker = state.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    config.ingest.skip_file = blocker.join("skipped.txt");
    let backend = Arc::new(RecordingBackend::failing("disk full"));

    let err = Orchestrator::new(Arc::new(config), backend)
        .run()
        .unwrap_err();

    assert!(matches!(err, WarcdexError::StorageError(_)));
    assert!(err.to_string().contains("disk full"));
}

#[test]
fn test_unwritable_skip_report_fails_a_clean_run() {
    let corpus = TestCorpus::new();
    corpus.add_archive("ClueWeb12_00/a/a.warc.gz", &[page("a1")]);
    let state = TempDir::new().unwrap();
    let mut config = test_config(corpus.root(), state.path());
    let blocker = state.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    config.ingest.skip_file = blocker.join("skipped.txt");
    let backend = Arc::new(RecordingBackend::new());

    let err = Orchestrator::new(Arc::new(config), backend)
        .run()
        .unwrap_err();

    assert!(err.is_fatal());
}

#[test]
fn test_partially_consumed_file_is_not_marked() {
    let corpus = TestCorpus::new();
    let archive = corpus.add_archive(
        "ClueWeb12_00/a/a.warc.gz",
        &[page("a1"), page("a2"), page("a3")],
    );
    let state = TempDir::new().unwrap();
    let config = Arc::new(test_config(corpus.root(), state.path()));
    let backend = Arc::new(RecordingBackend::stopping_after(1));

    let stats = Orchestrator::new(Arc::clone(&config), backend)
        .run()
        .unwrap();

    assert_eq!(stats.files_failed, 1);
    assert_eq!(stats.files_completed, 0);
    let ledger = ProgressLedger::open(&config.ingest.progress_file).unwrap();
    assert!(!ledger.contains(&ledger_key(&archive)));
}

#[test]
fn test_missing_corpus_root_is_fatal() {
    let state = TempDir::new().unwrap();
    let config = test_config(&state.path().join("no-corpus"), state.path());
    let backend = Arc::new(RecordingBackend::new());

    let err = Orchestrator::new(Arc::new(config), backend)
        .run()
        .unwrap_err();

    assert!(matches!(err, WarcdexError::InvalidPath(_)));
}

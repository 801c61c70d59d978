//! Orchestrator happy paths and resumption

use std::sync::Arc;

use crate::common::{test_config, RecordingBackend, TestCorpus, WarcRecord};
use serial_test::serial;
use tempfile::TempDir;
use warcdex::core::ingest::{ledger_key, Orchestrator, ProgressLedger};

const HI_PAGE: &str =
    "<html><head><title>Hi</title></head><body>Hello <script>bad()</script>World</body></html>";

fn page(id: &str) -> WarcRecord {
    WarcRecord::new(id, &format!("http://www.{id}.org/")).html(&format!("<p>{id}</p>"))
}

#[test]
fn test_two_record_scenario() {
    let corpus = TestCorpus::new();
    let archive = corpus.add_archive(
        "ClueWeb12_00/0000tw/0000tw-00.warc.gz",
        &[
            WarcRecord::new("clueweb12-0000tw-00-00001", "https://user@www.example.com:8080/p")
                .html(HI_PAGE),
            WarcRecord::new("clueweb12-0000tw-00-00002", "http://x.org/").without_url(),
        ],
    );
    let state = TempDir::new().unwrap();
    let config = Arc::new(test_config(corpus.root(), state.path()));
    let backend = Arc::new(RecordingBackend::new());

    let stats = Orchestrator::new(Arc::clone(&config), backend.clone())
        .run()
        .unwrap();

    assert_eq!(backend.ids("clueweb12"), vec!["clueweb12-0000tw-00-00001"]);
    let doc = backend
        .document("clueweb12", "clueweb12-0000tw-00-00001")
        .unwrap();
    assert_eq!(doc.title, "Hi");
    assert_eq!(doc.domain, "example.com");
    assert!(doc.body.contains("Hello"));
    assert!(doc.body.contains("World"));
    assert!(!doc.body.contains("bad()"));

    assert_eq!(stats.files_completed, 1);
    assert_eq!(stats.records_seen, 2);
    assert_eq!(stats.records_dropped, 1);
    assert_eq!(stats.documents_indexed, 1);

    let ledger = ProgressLedger::open(&config.ingest.progress_file).unwrap();
    assert!(ledger.contains(&ledger_key(&archive)));
}

#[test]
fn test_rerun_skips_completed_files() {
    let corpus = TestCorpus::new();
    corpus.add_archive("ClueWeb12_00/a/a.warc.gz", &[page("a1"), page("a2")]);
    corpus.add_archive("ClueWeb12_00/b/b.warc.gz", &[page("b1")]);
    let state = TempDir::new().unwrap();
    let config = Arc::new(test_config(corpus.root(), state.path()));
    let backend = Arc::new(RecordingBackend::new());

    let first = Orchestrator::new(Arc::clone(&config), backend.clone())
        .run()
        .unwrap();
    assert_eq!(first.files_completed, 2);
    assert_eq!(backend.bulk_call_count(), 2);

    let second = Orchestrator::new(Arc::clone(&config), backend.clone())
        .run()
        .unwrap();
    assert_eq!(second.files_found, 2);
    assert_eq!(second.files_already_done, 2);
    assert_eq!(second.files_completed, 0);
    assert_eq!(backend.bulk_call_count(), 2);

    let mut ids = backend.ids("clueweb12");
    ids.sort();
    assert_eq!(ids, vec!["a1", "a2", "b1"]);
}

#[test]
fn test_new_file_picked_up_on_rerun() {
    let corpus = TestCorpus::new();
    corpus.add_archive("ClueWeb12_00/a/a.warc.gz", &[page("a1")]);
    let state = TempDir::new().unwrap();
    let config = Arc::new(test_config(corpus.root(), state.path()));
    let backend = Arc::new(RecordingBackend::new());

    Orchestrator::new(Arc::clone(&config), backend.clone())
        .run()
        .unwrap();
    corpus.add_archive("ClueWeb12_01/b/b.warc.gz", &[page("b1")]);
    let stats = Orchestrator::new(Arc::clone(&config), backend.clone())
        .run()
        .unwrap();

    assert_eq!(stats.files_already_done, 1);
    assert_eq!(stats.files_completed, 1);
    assert_eq!(backend.ids("clueweb12"), vec!["a1", "b1"]);
}

#[test]
fn test_reset_progress_reprocesses_everything() {
    let corpus = TestCorpus::new();
    corpus.add_archive("ClueWeb12_00/a/a.warc.gz", &[page("a1")]);
    let state = TempDir::new().unwrap();
    let mut config = test_config(corpus.root(), state.path());
    let backend = Arc::new(RecordingBackend::new());

    Orchestrator::new(Arc::new(config.clone()), backend.clone())
        .run()
        .unwrap();

    config.ingest.reset_progress = true;
    let stats = Orchestrator::new(Arc::new(config), backend.clone())
        .run()
        .unwrap();

    assert_eq!(stats.files_already_done, 0);
    assert_eq!(stats.files_completed, 1);
    assert_eq!(backend.bulk_call_count(), 2);
}

#[test]
fn test_zero_record_file_is_marked_complete() {
    let corpus = TestCorpus::new();
    let empty = corpus.add_archive("ClueWeb12_00/e/empty.warc.gz", &[]);
    let no_marker = corpus.add_raw(
        "ClueWeb12_00/e/garbage.warc.gz",
        &crate::common::gzip_members(&[b"not an archive at all".to_vec()]),
    );
    let state = TempDir::new().unwrap();
    let config = Arc::new(test_config(corpus.root(), state.path()));
    let backend = Arc::new(RecordingBackend::new());

    let stats = Orchestrator::new(Arc::clone(&config), backend.clone())
        .run()
        .unwrap();

    assert_eq!(stats.files_completed, 2);
    assert_eq!(stats.documents_indexed, 0);
    let ledger = ProgressLedger::open(&config.ingest.progress_file).unwrap();
    assert!(ledger.contains(&ledger_key(&empty)));
    assert!(ledger.contains(&ledger_key(&no_marker)));
}

#[test]
fn test_rejected_ids_go_to_skip_report() {
    let corpus = TestCorpus::new();
    corpus.add_archive(
        "ClueWeb12_00/a/a.warc.gz",
        &[page("keep"), page("drop1"), page("drop2")],
    );
    let state = TempDir::new().unwrap();
    let config = Arc::new(test_config(corpus.root(), state.path()));
    std::fs::create_dir_all(config.ingest.skip_file.parent().unwrap()).unwrap();
    std::fs::write(&config.ingest.skip_file, "stale\n").unwrap();
    let backend = Arc::new(RecordingBackend::rejecting(&["drop1", "drop2"]));

    let stats = Orchestrator::new(Arc::clone(&config), backend.clone())
        .run()
        .unwrap();

    assert_eq!(stats.documents_indexed, 1);
    assert_eq!(stats.documents_rejected, 2);
    assert_eq!(stats.files_completed, 1);
    assert_eq!(
        std::fs::read_to_string(&config.ingest.skip_file).unwrap(),
        "drop1\ndrop2\n"
    );
}

#[test]
fn test_subset_pattern_limits_files() {
    let corpus = TestCorpus::new();
    corpus.add_archive("ClueWeb12_00/a/a.warc.gz", &[page("a1")]);
    corpus.add_archive("ClueWeb12_01/b/b.warc.gz", &[page("b1")]);
    let state = TempDir::new().unwrap();
    let mut config = test_config(corpus.root(), state.path());
    config.corpus.subset_pattern = "ClueWeb12_01".to_string();
    let backend = Arc::new(RecordingBackend::new());

    let stats = Orchestrator::new(Arc::new(config), backend.clone())
        .run()
        .unwrap();

    assert_eq!(stats.files_found, 1);
    assert_eq!(backend.ids("clueweb12"), vec!["b1"]);
}

#[test]
fn test_many_files_many_workers() {
    let corpus = TestCorpus::new();
    for f in 0..12 {
        let records: Vec<_> = (0..5).map(|r| page(&format!("f{f}r{r}"))).collect();
        corpus.add_archive(&format!("ClueWeb12_0{}/d/{f}.warc.gz", f % 3), &records);
    }
    let state = TempDir::new().unwrap();
    let mut config = test_config(corpus.root(), state.path());
    config.ingest.workers = 4;
    config.corpus.shuffle = true;
    let config = Arc::new(config);
    let backend = Arc::new(RecordingBackend::new());

    let stats = Orchestrator::new(Arc::clone(&config), backend.clone())
        .run()
        .unwrap();

    assert_eq!(stats.files_completed, 12);
    assert_eq!(stats.documents_indexed, 60);
    assert_eq!(backend.ids("clueweb12").len(), 60);
    assert_eq!(
        ProgressLedger::open(&config.ingest.progress_file)
            .unwrap()
            .len(),
        12
    );
}

#[test]
fn test_document_order_within_file() {
    let corpus = TestCorpus::new();
    corpus.add_archive(
        "ClueWeb12_00/a/a.warc.gz",
        &[page("r1"), page("r2"), page("r3"), page("r4")],
    );
    let state = TempDir::new().unwrap();
    let config = Arc::new(test_config(corpus.root(), state.path()));
    let backend = Arc::new(RecordingBackend::new());

    Orchestrator::new(config, backend.clone()).run().unwrap();

    assert_eq!(backend.ids("clueweb12"), vec!["r1", "r2", "r3", "r4"]);
}

#[test]
fn test_ensure_index_called_once_per_job() {
    let corpus = TestCorpus::new();
    corpus.add_archive("ClueWeb12_00/a/a.warc.gz", &[page("a1")]);
    corpus.add_archive("ClueWeb12_00/b/b.warc.gz", &[page("b1")]);
    let state = TempDir::new().unwrap();
    let mut config = test_config(corpus.root(), state.path());
    config.index.name = "cw12b".to_string();
    let backend = Arc::new(RecordingBackend::new());

    Orchestrator::new(Arc::new(config), backend.clone())
        .run()
        .unwrap();

    assert_eq!(
        *backend.ensure_calls.lock().unwrap(),
        vec![("cw12b".to_string(), false)]
    );
}

/// Restores the working directory when dropped
struct CurrentDirGuard(std::path::PathBuf);

impl CurrentDirGuard {
    fn enter(dir: &std::path::Path) -> Self {
        let previous = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir).unwrap();
        Self(previous)
    }
}

impl Drop for CurrentDirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.0);
    }
}

#[test]
#[serial]
fn test_relative_root_in_two_directories_keeps_both_corpora() {
    let one = TestCorpus::new();
    one.add_archive("corpus/ClueWeb12_00/a/a.warc.gz", &[page("one-doc")]);
    let two = TestCorpus::new();
    two.add_archive("corpus/ClueWeb12_00/a/a.warc.gz", &[page("two-doc")]);
    let state = TempDir::new().unwrap();
    let config = Arc::new(test_config(std::path::Path::new("corpus"), state.path()));
    let backend = Arc::new(RecordingBackend::new());

    let first = {
        let _cwd = CurrentDirGuard::enter(one.root());
        Orchestrator::new(Arc::clone(&config), backend.clone())
            .run()
            .unwrap()
    };
    let second = {
        let _cwd = CurrentDirGuard::enter(two.root());
        Orchestrator::new(Arc::clone(&config), backend.clone())
            .run()
            .unwrap()
    };

    assert_eq!(first.files_completed, 1);
    assert_eq!(second.files_already_done, 0);
    assert_eq!(second.files_completed, 1);
    assert_eq!(backend.ids("clueweb12"), vec!["one-doc", "two-doc"]);
}

#[test]
fn test_root_spelling_does_not_change_ledger_keys() {
    let corpus = TestCorpus::new();
    corpus.add_archive("ClueWeb12_00/a/a.warc.gz", &[page("a1")]);
    let state = TempDir::new().unwrap();
    let mut config = test_config(corpus.root(), state.path());
    let backend = Arc::new(RecordingBackend::new());

    Orchestrator::new(Arc::new(config.clone()), backend.clone())
        .run()
        .unwrap();

    config.corpus.root = corpus.root().join(".");
    let stats = Orchestrator::new(Arc::new(config), backend.clone())
        .run()
        .unwrap();

    assert_eq!(stats.files_already_done, 1);
    assert_eq!(stats.files_completed, 0);
    assert_eq!(backend.ids("clueweb12"), vec!["a1"]);
}

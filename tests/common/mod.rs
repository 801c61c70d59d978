// Common test utilities and fixtures

pub mod fixtures;

// Re-export commonly used items
// Note: These may appear unused in some harnesses but are used in others
#[allow(unused_imports)]
pub use fixtures::{gzip_members, info_record, TestCorpus, WarcRecord};
#[allow(unused_imports)]
pub use helpers::{test_config, RecordingBackend};

//! Skip report: ids the index refused during a run.

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use crate::core::error::Result;

/// Run-wide list of refused document ids
///
/// Filled concurrently by the workers and written once at job end.
#[derive(Debug, Default)]
pub struct SkipReport {
    ids: Mutex<Vec<String>>,
}

impl SkipReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the ids one file's bulk call refused, keeping their order
    pub fn record(&self, ids: impl IntoIterator<Item = String>) {
        self.ids
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(ids);
    }

    pub fn len(&self) -> usize {
        self.ids.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the recorded ids
    pub fn ids(&self) -> Vec<String> {
        self.ids.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Replace the file at `path` with one id per line
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let ids = self.ids.lock().unwrap_or_else(|e| e.into_inner());
        let mut contents = String::with_capacity(ids.iter().map(|id| id.len() + 1).sum());
        for id in ids.iter() {
            contents.push_str(id);
            contents.push('\n');
        }
        fs::write(path, contents)?;

        tracing::info!("Wrote {} skipped ids to {:?}", ids.len(), path);
        Ok(())
    }

    /// Count the ids in a previously written report
    pub fn count_in(path: &Path) -> Result<usize> {
        if !path.exists() {
            return Ok(0);
        }
        let contents = fs::read_to_string(path)?;
        Ok(contents.lines().filter(|l| !l.trim().is_empty()).count())
    }
}

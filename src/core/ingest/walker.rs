//! Corpus walker with pattern-based filtering.
//!
//! The corpus root holds one subdirectory per segment (`ClueWeb12_00`,
//! `ClueWeb12_01`, ...). Segments are selected by matching their
//! directory name, then every archive below a selected segment is
//! collected by matching its file name. Walk errors (permission denied,
//! etc.) are logged and skipped.

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::core::config::CorpusConfig;
use crate::core::error::{Result, WarcdexError};

/// Walks a corpus root for archive files
pub struct CorpusWalker {
    /// Pattern for segment directory names (e.g., "ClueWeb12_*")
    subset_pattern: Pattern,

    /// Pattern for archive file names (e.g., "*.warc.gz")
    file_pattern: Pattern,
}

impl CorpusWalker {
    /// Create a new corpus walker
    ///
    /// # Returns
    ///
    /// An error if either pattern is invalid
    pub fn new(subset_pattern: &str, file_pattern: &str) -> Result<Self> {
        let parse = |what: &str, p: &str| {
            Pattern::new(p).map_err(|e| {
                WarcdexError::ConfigError(format!("Invalid {what} pattern '{p}': {e}"))
            })
        };

        Ok(Self {
            subset_pattern: parse("subset", subset_pattern)?,
            file_pattern: parse("file", file_pattern)?,
        })
    }

    pub fn from_config(config: &CorpusConfig) -> Result<Self> {
        Self::new(&config.subset_pattern, &config.file_pattern)
    }

    /// Collect all matching archives under `root`, sorted by path
    pub fn collect_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(WarcdexError::InvalidPath(format!(
                "Corpus root {root:?} is not a directory"
            )));
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| self.should_descend(e))
        {
            match entry {
                Ok(entry) => {
                    // Loose files directly under the root belong to no segment
                    if !entry.file_type().is_file() || entry.depth() < 2 {
                        continue;
                    }

                    if self.matches_file(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    tracing::warn!("Walk error: {}", e);
                }
            }
        }

        files.sort();
        tracing::debug!("Found {} archives under {:?}", files.len(), root);

        Ok(files)
    }

    /// Skip hidden directories and segments outside the subset
    fn should_descend(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }

        let Some(name) = entry.file_name().to_str() else {
            return false;
        };

        if name.starts_with('.') {
            return false;
        }

        if entry.depth() == 1 && !self.subset_pattern.matches(name) {
            tracing::debug!("Skipping segment outside subset: {:?}", entry.path());
            return false;
        }

        true
    }

    fn matches_file(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|f| f.to_str())
            .map(|f| self.file_pattern.matches(f))
            .unwrap_or(false)
    }
}

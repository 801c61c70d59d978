//! XDG Base Directory Support
//!
//! Resolves where warcdex keeps its configuration, its search indexes
//! and its run state (progress ledger, skip report).

use std::env;
use std::fs;
use std::path::PathBuf;

/// XDG directory structure for warcdex
#[derive(Debug, Clone)]
pub struct XdgDirs {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
    pub state_dir: PathBuf,
}

impl XdgDirs {
    /// Create new XDG directory structure with proper resolution order
    ///
    /// Priority order (highest to lowest):
    /// 1. Explicit WARCDEX_* env vars
    /// 2. XDG_* environment variables
    /// 3. XDG defaults (~/.config, ~/.local/share, ~/.local/state)
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve("WARCDEX_CONFIG_DIR", "XDG_CONFIG_HOME", &[".config"]),
            data_dir: Self::resolve("WARCDEX_DATA_DIR", "XDG_DATA_HOME", &[".local", "share"]),
            state_dir: Self::resolve(
                "WARCDEX_STATE_DIR",
                "XDG_STATE_HOME",
                &[".local", "state"],
            ),
        }
    }

    fn resolve(own_var: &str, xdg_var: &str, default_segments: &[&str]) -> PathBuf {
        if let Ok(dir) = env::var(own_var) {
            return PathBuf::from(dir);
        }

        if let Ok(xdg) = env::var(xdg_var) {
            return PathBuf::from(xdg).join("warcdex");
        }

        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        for segment in default_segments {
            path.push(segment);
        }
        path.join("warcdex")
    }

    /// Get config file path
    pub fn config_file(&self) -> PathBuf {
        // Check WARCDEX_CONFIG_FILE first (explicit override)
        if let Ok(file) = env::var("WARCDEX_CONFIG_FILE") {
            return PathBuf::from(file);
        }

        self.config_dir.join("config.toml")
    }

    /// Root directory holding one subdirectory per search index
    pub fn indexes_dir(&self) -> PathBuf {
        self.data_dir.join("indexes")
    }

    /// Default progress ledger location
    pub fn progress_file(&self) -> PathBuf {
        self.state_dir.join("progress.log")
    }

    /// Default skip report location
    pub fn skip_report_file(&self) -> PathBuf {
        self.state_dir.join("skipped.txt")
    }

    /// Create all XDG directories if they don't exist
    pub fn ensure_dirs_exist(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.config_dir)?;
        fs::create_dir_all(self.indexes_dir())?;
        fs::create_dir_all(&self.state_dir)?;
        Ok(())
    }
}

impl Default for XdgDirs {
    fn default() -> Self {
        Self::new()
    }
}

// Application state module
// Immutable per-process state shared by every connection

use std::path::{Path, PathBuf};

use super::types::Config;

/// Application state
///
/// Built once at startup and shared behind an `Arc`. Nothing in here changes while the
/// server runs, so request handlers never need a lock.
#[derive(Debug)]
pub struct AppState {
    pub config: Config,
    /// Directory the server was started in; root for listing and content lookups
    pub root_dir: PathBuf,
}

impl AppState {
    pub fn new(config: Config, root_dir: PathBuf) -> Self {
        Self { config, root_dir }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn script_extension(&self) -> &str {
        &self.config.content.script_extension
    }

    pub fn index_file(&self) -> &str {
        &self.config.content.index_file
    }
}

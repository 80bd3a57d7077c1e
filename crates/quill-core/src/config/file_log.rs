use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the append-only file store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileLogConfig {
    /// Path of the JSON-lines log file
    pub path: PathBuf,

    /// Whether to fsync after each append (default: false).
    ///
    /// Appends are always written through to the OS before returning; this
    /// additionally forces them to the device.
    #[serde(default)]
    pub sync_on_append: bool,
}

impl FileLogConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sync_on_append: false,
        }
    }

    pub fn with_sync_on_append(mut self, sync_on_append: bool) -> Self {
        self.sync_on_append = sync_on_append;
        self
    }
}

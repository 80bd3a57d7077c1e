//! Backend selection from a backend name plus a flat key-value map.
//!
//! Recognized keys:
//! - `filePath` (required, file backend), `syncOnAppend`
//! - `dbPath` (required, relational backend), `walMode`, `busyTimeoutMs`,
//!   `readPoolSize`

use super::{FileLogConfig, SqliteConfig};
use crate::error::{QuillError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub const FILE_PATH_KEY: &str = "filePath";
pub const SYNC_ON_APPEND_KEY: &str = "syncOnAppend";
pub const DB_PATH_KEY: &str = "dbPath";
pub const WAL_MODE_KEY: &str = "walMode";
pub const BUSY_TIMEOUT_KEY: &str = "busyTimeoutMs";
pub const READ_POOL_SIZE_KEY: &str = "readPoolSize";

/// The closed set of storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Append-only JSON-lines file
    File,
    /// Indexed SQLite table
    Relational,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::File => "file",
            BackendKind::Relational => "relational",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = QuillError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(BackendKind::File),
            "relational" | "db" | "sqlite" => Ok(BackendKind::Relational),
            other => Err(QuillError::Config(format!(
                "unsupported backend type: {}",
                other
            ))),
        }
    }
}

/// Fully validated configuration for one backend
#[derive(Debug, Clone)]
pub enum StoreConfig {
    File(FileLogConfig),
    Relational(SqliteConfig),
}

impl StoreConfig {
    /// Validate `settings` for `kind`.
    ///
    /// Fails without side effects when a required key is missing or an
    /// optional key does not parse.
    pub fn from_settings(kind: BackendKind, settings: &HashMap<String, String>) -> Result<Self> {
        match kind {
            BackendKind::File => {
                let path = required(settings, FILE_PATH_KEY, kind)?;
                let mut config = FileLogConfig::new(path);
                if let Some(sync) = optional::<bool>(settings, SYNC_ON_APPEND_KEY)? {
                    config = config.with_sync_on_append(sync);
                }
                Ok(StoreConfig::File(config))
            }
            BackendKind::Relational => {
                let path = required(settings, DB_PATH_KEY, kind)?;
                let mut config = SqliteConfig::new(path);
                if let Some(wal) = optional::<bool>(settings, WAL_MODE_KEY)? {
                    config = config.with_wal_mode(wal);
                }
                if let Some(timeout) = optional::<u64>(settings, BUSY_TIMEOUT_KEY)? {
                    config = config.with_busy_timeout_ms(timeout);
                }
                if let Some(size) = optional::<usize>(settings, READ_POOL_SIZE_KEY)? {
                    config = config.with_read_pool_size(size);
                }
                Ok(StoreConfig::Relational(config))
            }
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            StoreConfig::File(_) => BackendKind::File,
            StoreConfig::Relational(_) => BackendKind::Relational,
        }
    }
}

fn required<'a>(
    settings: &'a HashMap<String, String>,
    key: &str,
    kind: BackendKind,
) -> Result<&'a str> {
    match settings.get(key).map(|v| v.trim()) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(QuillError::Config(format!(
            "{} not provided for {} backend",
            key, kind
        ))),
    }
}

fn optional<T>(settings: &HashMap<String, String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    settings
        .get(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| QuillError::Config(format!("invalid value for {}: {}", key, e)))
        })
        .transpose()
}

pub mod backend;
pub mod file_log;
pub mod sqlite;

pub use backend::{BackendKind, StoreConfig};
pub use file_log::FileLogConfig;
pub use sqlite::{SqliteConfig, SynchronousMode};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task {0} not found")]
    NotFound(u64),

    #[error("task name must not be empty")]
    EmptyName,

    #[error("invalid date '{0}': use DD.MM.YYYY or YYYY-MM-DD")]
    InvalidDate(String),

    #[error("malformed task file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

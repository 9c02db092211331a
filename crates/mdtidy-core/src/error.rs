use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TidyError {
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not a directory: {0:?}")]
    NotADirectory(PathBuf),

    #[error("Incompatible cache version {found} (expected {expected})")]
    CacheVersion { found: u32, expected: u32 },

    #[error("Cache was built for {found:?}, not {expected:?}")]
    CacheRootMismatch { found: PathBuf, expected: PathBuf },
}

impl TidyError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TidyError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type TidyResult<T> = Result<T, TidyError>;

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OutputError>;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("no rule handles module '{}'", .0.display())]
    UnhandledModule(PathBuf),

    #[error("invalid output file name '{0}'")]
    InvalidFileName(String),

    #[error("'{first}' and '{second}' would both be written to '{file_name}'")]
    NameConflict {
        file_name: String,
        first: String,
        second: String,
    },

    #[error("staging directory not found: {}", .0.display())]
    StagingNotFound(PathBuf),

    #[error("failed to scan '{}': {source}", path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed manifest '{}': {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("manifest has no entry for '{0}'")]
    MissingEntry(String),

    #[error(transparent)]
    Config(#[from] trellis_config::ConfigError),
}

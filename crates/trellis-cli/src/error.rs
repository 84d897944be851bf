//! Error handling for the Trellis CLI.
//!
//! `CliError` is what commands return. Library errors convert into it with
//! `#[from]`. At the binary boundary errors become `miette` reports (see
//! [`cli_error_to_miette`]).

mod miette;

use std::path::PathBuf;

use thiserror::Error;

pub use self::miette::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Settings could not be loaded or are inconsistent
    #[error("Configuration error: {0}")]
    Config(#[from] trellis_config::ConfigError),

    /// Cleanup, staging or emission failed
    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while producing output.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Staging directory not found: {}\n\nHint: Point --staging at the directory the bundler engine compiled into", .0.display())]
    StagingNotFound(PathBuf),

    /// Deleting stale output failed; the build is aborted before writing
    #[error("Failed to clean {}: {source}\n\nHint: Check permissions on the output directory", .dir.display())]
    CleanupFailed {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No rule handles '{}'\n\nHint: Only scripts, stylesheets, fonts and images can be emitted", .0.display())]
    UnhandledModule(PathBuf),

    #[error(transparent)]
    Output(trellis_output::OutputError),
}

impl From<trellis_output::OutputError> for BuildError {
    fn from(err: trellis_output::OutputError) -> Self {
        use trellis_output::OutputError;
        match err {
            OutputError::StagingNotFound(dir) => BuildError::StagingNotFound(dir),
            OutputError::UnhandledModule(path) => BuildError::UnhandledModule(path),
            other => BuildError::Output(other),
        }
    }
}

impl From<trellis_output::OutputError> for CliError {
    fn from(err: trellis_output::OutputError) -> Self {
        CliError::Build(err.into())
    }
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

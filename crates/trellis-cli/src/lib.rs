//! Trellis CLI.
//!
//! Command-line surface over `trellis-config` and `trellis-output`:
//!
//! - [`error`] - CLI error types with actionable hints
//! - [`logger`] - `tracing` subscriber setup
//! - [`ui`] - status lines and build summaries on stderr
//! - `commands` - `resolve`, `build`, `clean` and `check`
//!
//! Status output and logs go to stderr; stdout is reserved for machine-readable
//! output such as `trellis resolve`.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{BuildError, CliError, Result};

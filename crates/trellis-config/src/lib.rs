//! Build configuration for Trellis.
//!
//! Turns environment state (`NODE_ENV`, `PORT`, the current revision) and an
//! optional `trellis.config.json` into the descriptors handed to the external
//! bundler engine: one browser bundle descriptor, and in production a second
//! descriptor for the server-rendering bundle plus a pre-build cleanup step.
//!
//! ```
//! use trellis_config::{resolve, BuildContext, BuildMode, FixedRevision, Settings};
//!
//! let settings = Settings {
//!     node_env: Some("development".into()),
//!     ..Settings::default()
//! };
//! let ctx = BuildContext::from_settings(&settings, &FixedRevision::absent());
//! let build = resolve(&ctx);
//!
//! assert_eq!(build.mode, BuildMode::Development);
//! assert!(build.server.is_none());
//! assert!(build.cleanup.is_none());
//! ```

pub mod cleanup;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod mode;
pub mod resolver;
pub mod revision;
pub mod settings;

// Re-export main types
pub use cleanup::{CleanupAction, CleanupReport};
pub use context::BuildContext;
pub use descriptor::*;
pub use error::{ConfigError, Result};
pub use mode::BuildMode;
pub use resolver::{resolve, ResolvedBuild};
pub use revision::{lookup_revision, FixedRevision, GitRevision, RevisionError, RevisionSource};
pub use settings::{ProjectLayout, Settings, CONFIG_FILE_NAME, DEFAULT_PORT};

//! Immutable build context, constructed once per process.

use crate::mode::BuildMode;
use crate::revision::{lookup_revision, RevisionSource};
use crate::settings::{ProjectLayout, Settings};

/// Everything the resolver reads, captured up front.
///
/// Deeper logic takes this by reference instead of consulting the process
/// environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    pub mode: BuildMode,
    /// Backend port for the development proxy
    pub port: u16,
    pub revision: Option<String>,
    pub layout: ProjectLayout,
}

impl BuildContext {
    pub fn new(mode: BuildMode, port: u16, revision: Option<String>, layout: ProjectLayout) -> Self {
        Self {
            mode,
            port,
            revision,
            layout,
        }
    }

    /// Freeze `settings` into a context.
    ///
    /// A revision pinned in the settings wins; otherwise `source` is asked
    /// once and its failure leaves the revision absent.
    pub fn from_settings(settings: &Settings, source: &dyn RevisionSource) -> Self {
        let mode = BuildMode::from_signal(settings.node_env.as_deref());
        let revision = match &settings.revision {
            Some(pinned) => Some(pinned.clone()),
            None => lookup_revision(source),
        };

        tracing::info!(
            %mode,
            port = settings.port,
            revision = revision.as_deref().unwrap_or("<none>"),
            "build context ready"
        );

        Self::new(mode, settings.port, revision, settings.layout.clone())
    }
}

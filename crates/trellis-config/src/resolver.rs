//! Single-pass resolution of a [`BuildContext`] into descriptors.

use serde::Serialize;

use crate::cleanup::CleanupAction;
use crate::context::BuildContext;
use crate::descriptor::{BuildDescriptor, ServerBuildDescriptor};
use crate::mode::BuildMode;

/// Everything one build run needs.
///
/// `server` and `cleanup` are present exactly when `mode` is production.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedBuild {
    pub mode: BuildMode,
    pub revision: Option<String>,
    pub client: BuildDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerBuildDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup: Option<CleanupAction>,
}

/// Resolve descriptors for `ctx`. Pure: reads nothing but `ctx`.
pub fn resolve(ctx: &BuildContext) -> ResolvedBuild {
    let client = BuildDescriptor::client(ctx);

    let (server, cleanup) = match ctx.mode {
        BuildMode::Production => (
            Some(ServerBuildDescriptor::server(ctx)),
            Some(CleanupAction::new(
                client.output.path.clone(),
                ctx.layout.manifest_name.clone(),
            )),
        ),
        BuildMode::Development => (None, None),
    };

    tracing::debug!(
        mode = %ctx.mode,
        rules = client.rules.len(),
        plugins = client.plugins.len(),
        server = server.is_some(),
        "resolved build descriptors"
    );

    ResolvedBuild {
        mode: ctx.mode,
        revision: ctx.revision.clone(),
        client,
        server,
        cleanup,
    }
}

//! Descriptor types handed to the external bundler engine.
//!
//! A [`BuildDescriptor`] describes the browser bundle and is always produced.
//! A [`ServerBuildDescriptor`] describes the server-rendering bundle and is
//! only produced in production.

pub mod dev_server;
pub mod naming;
pub mod optimization;
pub mod plugins;
pub mod rules;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use dev_server::{DevServerDescriptor, OverlayOptions, ProxyRule, PROXY_ALL};
pub use naming::{content_hash, FilenameTemplate, OutputNaming, CONTENT_HASH_LENGTH};
pub use optimization::{
    CacheGroup, ChunkAssigner, ChunkScope, OptimizationPolicy, SplitChunks, STYLES_CHUNK,
};
pub use plugins::{PluginPipeline, PluginStep, MODE_CONSTANT, REVISION_CONSTANT};
pub use rules::{
    client_rules, server_rules, AssetKind, AssetRule, GifOptions, ImageOptimization, JpegOptions,
    LoaderStep, PngOptions, RuleMatcher,
};

use crate::context::BuildContext;
use crate::mode::BuildMode;

/// Name of the browser bundle's entry chunk.
pub const CLIENT_ENTRY_NAME: &str = "main";

/// Name of the server bundle's entry chunk.
pub const SERVER_ENTRY_NAME: &str = "server";

/// Source map style used for development builds.
pub const DEV_SOURCE_MAP: &str = "eval-cheap-module-source-map";

/// Runtime the bundle is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Web,
    Node,
}

/// Module format of a library bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryTarget {
    Commonjs2,
}

/// Dependencies left out of the bundle and loaded at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Externals {
    /// Every package resolved from `node_modules`
    NodeModules,
}

impl Externals {
    pub fn excludes(&self, module_path: &Path) -> bool {
        match self {
            Externals::NodeModules => module_path
                .components()
                .any(|c| c.as_os_str() == "node_modules"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDescriptor {
    pub path: PathBuf,
    pub public_path: String,
    pub naming: OutputNaming,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_target: Option<LibraryTarget>,
    /// Where the asset manifest is written, if this bundle has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,
}

/// Browser bundle descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildDescriptor {
    pub mode: BuildMode,
    pub target: Target,
    pub entry: EntryPoint,
    pub output: OutputDescriptor,
    pub rules: Vec<AssetRule>,
    pub plugins: Vec<PluginStep>,
    pub optimization: OptimizationPolicy,
    pub constants: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devtool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_server: Option<DevServerDescriptor>,
}

impl BuildDescriptor {
    pub fn client(ctx: &BuildContext) -> Self {
        let layout = &ctx.layout;
        let naming = OutputNaming::for_mode(ctx.mode);
        let output_dir = layout.client_output_dir();
        let manifest_path = layout.manifest_path();
        let define = PluginStep::define_constants(ctx);
        let constants = definitions(&define);

        let manifest_step = PluginStep::AssetManifest {
            path: manifest_path.clone(),
            public_path: layout.public_path.clone(),
        };
        let pipeline = PluginPipeline::new([define]);
        let plugins = match ctx.mode {
            BuildMode::Production => pipeline.then_all([
                PluginStep::CleanOutput {
                    dir: output_dir.clone(),
                    preserve: layout.manifest_name.clone(),
                },
                PluginStep::ExtractCss {
                    filename: naming.css_filename.clone(),
                    chunk_filename: naming.css_chunk_filename.clone(),
                },
                manifest_step,
            ]),
            BuildMode::Development => pipeline.then_all([
                manifest_step,
                PluginStep::HotModuleReplacement,
                PluginStep::ReactRefresh { overlay: false },
                PluginStep::ErrorOverlay,
            ]),
        }
        .build();

        Self {
            mode: ctx.mode,
            target: Target::Web,
            entry: EntryPoint {
                name: CLIENT_ENTRY_NAME.to_string(),
                path: layout.client_entry.clone(),
            },
            rules: client_rules(ctx.mode, &naming),
            output: OutputDescriptor {
                path: output_dir,
                public_path: layout.public_path.clone(),
                naming,
                library_target: None,
                manifest: Some(manifest_path),
            },
            plugins,
            optimization: OptimizationPolicy::client(ctx.mode),
            constants,
            devtool: ctx
                .mode
                .is_development()
                .then(|| DEV_SOURCE_MAP.to_string()),
            dev_server: ctx
                .mode
                .is_development()
                .then(|| DevServerDescriptor::for_context(ctx)),
        }
    }

    pub fn manifest_path(&self) -> Option<&Path> {
        self.output.manifest.as_deref()
    }

    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(PluginStep::name).collect()
    }
}

/// Server-rendering bundle descriptor: one CommonJS file for Node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerBuildDescriptor {
    pub mode: BuildMode,
    pub target: Target,
    pub entry: EntryPoint,
    pub output: OutputDescriptor,
    pub externals: Externals,
    pub rules: Vec<AssetRule>,
    pub plugins: Vec<PluginStep>,
    pub optimization: OptimizationPolicy,
    pub max_chunks: usize,
    pub constants: IndexMap<String, String>,
}

impl ServerBuildDescriptor {
    pub fn server(ctx: &BuildContext) -> Self {
        let layout = &ctx.layout;
        let naming = OutputNaming::server();
        let define = PluginStep::define_constants(ctx);
        let constants = definitions(&define);
        let max_chunks = 1;

        Self {
            mode: ctx.mode,
            target: Target::Node,
            entry: EntryPoint {
                name: SERVER_ENTRY_NAME.to_string(),
                path: layout.server_entry.clone(),
            },
            rules: server_rules(&naming),
            output: OutputDescriptor {
                path: layout.server_output_dir.clone(),
                public_path: layout.public_path.clone(),
                naming,
                library_target: Some(LibraryTarget::Commonjs2),
                manifest: None,
            },
            externals: Externals::NodeModules,
            plugins: PluginPipeline::new([define])
                .then(PluginStep::LimitChunkCount { max_chunks })
                .build(),
            optimization: OptimizationPolicy::server(),
            max_chunks,
            constants,
        }
    }
}

fn definitions(step: &PluginStep) -> IndexMap<String, String> {
    match step {
        PluginStep::DefineConstants { definitions } => definitions.clone(),
        _ => IndexMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ProjectLayout;

    fn ctx(mode: BuildMode) -> BuildContext {
        BuildContext::new(mode, 6969, Some("abc".into()), ProjectLayout::default())
    }

    #[test]
    fn production_plugin_order() {
        let client = BuildDescriptor::client(&ctx(BuildMode::Production));
        assert_eq!(
            client.plugin_names(),
            ["define-constants", "clean-output", "extract-css", "asset-manifest"]
        );
    }

    #[test]
    fn development_plugin_order() {
        let client = BuildDescriptor::client(&ctx(BuildMode::Development));
        assert_eq!(
            client.plugin_names(),
            [
                "define-constants",
                "asset-manifest",
                "hot-module-replacement",
                "react-refresh",
                "error-overlay"
            ]
        );
    }

    #[test]
    fn manifest_lives_in_output_dir() {
        let client = BuildDescriptor::client(&ctx(BuildMode::Production));
        assert_eq!(client.output.path, PathBuf::from("static/dist"));
        assert_eq!(
            client.manifest_path(),
            Some(Path::new("static/dist/manifest.json"))
        );
    }

    #[test]
    fn clean_step_preserves_manifest() {
        let client = BuildDescriptor::client(&ctx(BuildMode::Production));
        let clean = client
            .plugins
            .iter()
            .find(|p| matches!(p, PluginStep::CleanOutput { .. }))
            .unwrap();
        assert_eq!(
            clean,
            &PluginStep::CleanOutput {
                dir: PathBuf::from("static/dist"),
                preserve: "manifest.json".into(),
            }
        );
    }

    #[test]
    fn devtool_and_dev_server_only_in_development() {
        let dev = BuildDescriptor::client(&ctx(BuildMode::Development));
        let prod = BuildDescriptor::client(&ctx(BuildMode::Production));
        assert_eq!(dev.devtool.as_deref(), Some(DEV_SOURCE_MAP));
        assert!(dev.dev_server.is_some());
        assert!(prod.devtool.is_none());
        assert!(prod.dev_server.is_none());
    }

    #[test]
    fn server_descriptor_shape() {
        let server = ServerBuildDescriptor::server(&ctx(BuildMode::Production));
        assert_eq!(server.target, Target::Node);
        assert_eq!(server.entry.name, SERVER_ENTRY_NAME);
        assert_eq!(server.entry.path, PathBuf::from("src/components/App.jsx"));
        assert_eq!(server.output.library_target, Some(LibraryTarget::Commonjs2));
        assert_eq!(server.max_chunks, 1);
        assert!(!server.optimization.minimize);
        assert!(server.output.manifest.is_none());
        assert_ne!(
            server.output.path,
            BuildDescriptor::client(&ctx(BuildMode::Production)).output.path
        );
    }

    #[test]
    fn externals_match_installed_packages() {
        let externals = Externals::NodeModules;
        assert!(externals.excludes(Path::new("node_modules/react/index.js")));
        assert!(!externals.excludes(Path::new("src/components/App.jsx")));
    }

    #[test]
    fn constants_match_define_step() {
        let client = BuildDescriptor::client(&ctx(BuildMode::Production));
        assert_eq!(client.constants[REVISION_CONSTANT], "\"abc\"");
        assert_eq!(
            client.plugins[0],
            PluginStep::DefineConstants {
                definitions: client.constants.clone()
            }
        );
    }
}

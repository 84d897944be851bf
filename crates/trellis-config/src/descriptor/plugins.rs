//! Post-processing plugins and the builder that orders them.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::context::BuildContext;
use crate::descriptor::naming::FilenameTemplate;

/// Constant name the revision identifier is injected under.
pub const REVISION_CONSTANT: &str = "__COMMIT_HASH__";

/// Constant name the mode's environment string is injected under.
pub const MODE_CONSTANT: &str = "process.env.NODE_ENV";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "plugin", rename_all = "kebab-case")]
pub enum PluginStep {
    /// Compile-time constants; values are source snippets inlined verbatim
    DefineConstants { definitions: IndexMap<String, String> },
    /// Pre-build removal of stale output, keeping the manifest
    CleanOutput { dir: PathBuf, preserve: String },
    /// Pull stylesheets out of scripts into their own files
    ExtractCss {
        filename: FilenameTemplate,
        chunk_filename: FilenameTemplate,
    },
    /// Logical asset name to emitted file mapping
    AssetManifest { path: PathBuf, public_path: String },
    HotModuleReplacement,
    /// Component reload that keeps local state
    ReactRefresh { overlay: bool },
    ErrorOverlay,
    LimitChunkCount { max_chunks: usize },
}

impl PluginStep {
    pub fn name(&self) -> &'static str {
        match self {
            PluginStep::DefineConstants { .. } => "define-constants",
            PluginStep::CleanOutput { .. } => "clean-output",
            PluginStep::ExtractCss { .. } => "extract-css",
            PluginStep::AssetManifest { .. } => "asset-manifest",
            PluginStep::HotModuleReplacement => "hot-module-replacement",
            PluginStep::ReactRefresh { .. } => "react-refresh",
            PluginStep::ErrorOverlay => "error-overlay",
            PluginStep::LimitChunkCount { .. } => "limit-chunk-count",
        }
    }

    /// Constants injected for `ctx`.
    ///
    /// An absent revision is injected as `null`.
    pub fn define_constants(ctx: &BuildContext) -> Self {
        let mut definitions = IndexMap::new();
        definitions.insert(MODE_CONSTANT.to_string(), quote(ctx.mode.as_str()));
        definitions.insert(
            REVISION_CONSTANT.to_string(),
            ctx.revision.as_deref().map_or_else(|| "null".to_string(), quote),
        );
        PluginStep::DefineConstants { definitions }
    }
}

fn quote(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

/// Ordered plugin list: a base list, then mode-specific steps.
#[derive(Debug, Clone, Default)]
pub struct PluginPipeline {
    steps: Vec<PluginStep>,
}

impl PluginPipeline {
    pub fn new(base: impl IntoIterator<Item = PluginStep>) -> Self {
        Self {
            steps: base.into_iter().collect(),
        }
    }

    pub fn then(mut self, step: PluginStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn then_all(mut self, steps: impl IntoIterator<Item = PluginStep>) -> Self {
        self.steps.extend(steps);
        self
    }

    pub fn build(self) -> Vec<PluginStep> {
        self.steps
    }
}

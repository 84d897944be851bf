//! Minification and chunk-splitting policy.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::descriptor::rules::STYLE_TEST;
use crate::error::Result;
use crate::mode::BuildMode;

/// Name of the shared chunk every stylesheet is forced into.
pub const STYLES_CHUNK: &str = "styles";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationPolicy {
    pub minimize: bool,
    /// Minimizers run when `minimize` is set
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub minimizers: Vec<String>,
    pub split_chunks: SplitChunks,
}

impl OptimizationPolicy {
    pub fn client(mode: BuildMode) -> Self {
        let minimize = mode.is_production();
        Self {
            minimize,
            minimizers: if minimize {
                vec!["terser".to_string(), "css-minimizer".to_string()]
            } else {
                Vec::new()
            },
            split_chunks: SplitChunks {
                cache_groups: vec![CacheGroup::styles()],
            },
        }
    }

    /// Server bundles stay readable and are never minified twice.
    pub fn server() -> Self {
        Self {
            minimize: false,
            minimizers: Vec::new(),
            split_chunks: SplitChunks::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitChunks {
    pub cache_groups: Vec<CacheGroup>,
}

/// Which chunks a cache group may pull modules out of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkScope {
    All,
    Async,
    Initial,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheGroup {
    pub name: String,
    pub test: String,
    pub chunks: ChunkScope,
    /// Extract regardless of size and sharing thresholds
    pub enforce: bool,
}

impl CacheGroup {
    pub fn styles() -> Self {
        Self {
            name: STYLES_CHUNK.to_string(),
            test: STYLE_TEST.to_string(),
            chunks: ChunkScope::All,
            enforce: true,
        }
    }
}

impl SplitChunks {
    pub fn assigner(&self) -> Result<ChunkAssigner<'_>> {
        let groups = self
            .cache_groups
            .iter()
            .map(|group| Ok((Regex::new(&group.test)?, group)))
            .collect::<Result<Vec<_>>>()?;
        Ok(ChunkAssigner { groups })
    }
}

/// Decides the output chunk of a module.
#[derive(Debug)]
pub struct ChunkAssigner<'a> {
    groups: Vec<(Regex, &'a CacheGroup)>,
}

impl ChunkAssigner<'_> {
    /// Only enforced groups are applied; size-based splitting is left to the
    /// external bundler.
    pub fn assign<'m>(&'m self, module_path: &str, origin_chunk: &'m str) -> &'m str {
        self.groups
            .iter()
            .find(|(test, group)| group.enforce && test.is_match(module_path))
            .map_or(origin_chunk, |(_, group)| group.name.as_str())
    }
}

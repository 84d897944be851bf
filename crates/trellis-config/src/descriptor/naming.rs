//! Output filename policy.
//!
//! Development names are stable (`[name].js`) so incremental rebuilds keep the
//! same URLs; production names are content-addressed (`[contenthash].js`) so
//! every emitted URL can be cached forever.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::mode::BuildMode;

/// Hex digits of the content hash kept in filenames.
pub const CONTENT_HASH_LENGTH: usize = 20;

/// Hash file content for use in a filename.
///
/// SHA-256, hex encoded, truncated to [`CONTENT_HASH_LENGTH`].
pub fn content_hash(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    let mut hex = format!("{:x}", digest);
    hex.truncate(CONTENT_HASH_LENGTH);
    hex
}

/// Filename pattern with `[name]`, `[ext]` and `[contenthash]` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilenameTemplate(String);

impl FilenameTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_content_addressed(&self) -> bool {
        self.0.contains("[contenthash]")
    }

    /// Produce the concrete filename for one emitted file.
    ///
    /// The result depends only on the arguments, so identical content always
    /// yields the identical name.
    pub fn render(&self, name: &str, ext: &str, content: &[u8]) -> String {
        let mut rendered = self.0.replace("[name]", name).replace("[ext]", ext);
        if self.is_content_addressed() {
            rendered = rendered.replace("[contenthash]", &content_hash(content));
        }
        rendered
    }
}

impl fmt::Display for FilenameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Filename templates for every kind of emitted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputNaming {
    /// Entry chunk scripts
    pub filename: FilenameTemplate,
    /// Non-entry chunk scripts
    pub chunk_filename: FilenameTemplate,
    /// Entry chunk stylesheets
    pub css_filename: FilenameTemplate,
    /// Non-entry chunk stylesheets
    pub css_chunk_filename: FilenameTemplate,
    /// Fonts and images
    pub asset_filename: FilenameTemplate,
}

impl OutputNaming {
    pub fn for_mode(mode: BuildMode) -> Self {
        match mode {
            BuildMode::Development => Self {
                filename: FilenameTemplate::new("[name].js"),
                chunk_filename: FilenameTemplate::new("[name].chunk.js"),
                css_filename: FilenameTemplate::new("[name].css"),
                css_chunk_filename: FilenameTemplate::new("[name].chunk.css"),
                asset_filename: FilenameTemplate::new("[name].[ext]"),
            },
            BuildMode::Production => Self {
                filename: FilenameTemplate::new("[contenthash].js"),
                chunk_filename: FilenameTemplate::new("[contenthash].chunk.js"),
                css_filename: FilenameTemplate::new("[contenthash].css"),
                css_chunk_filename: FilenameTemplate::new("[contenthash].chunk.css"),
                asset_filename: FilenameTemplate::new("[contenthash].[ext]"),
            },
        }
    }

    /// Server bundles are loaded by path, never cached by a browser.
    pub fn server() -> Self {
        Self {
            filename: FilenameTemplate::new("[name].js"),
            chunk_filename: FilenameTemplate::new("[name].js"),
            css_filename: FilenameTemplate::new("[name].css"),
            css_chunk_filename: FilenameTemplate::new("[name].css"),
            asset_filename: FilenameTemplate::new("[name].[ext]"),
        }
    }
}

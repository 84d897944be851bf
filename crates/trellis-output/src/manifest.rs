//! Asset manifest: logical asset name to public URL of the emitted file.
//!
//! Keys are `<chunk>.js`, `<chunk>.css`, or the staged path of a font or
//! image (`img/logo.png`). Identical assets share one URL. The
//! server-rendering layer loads the manifest to find the URLs to put into the
//! page.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{OutputError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(IndexMap<String, String>);

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, url: impl Into<String>) {
        self.0.insert(key.into(), url.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Like [`get`](Self::get), but a missing key is an error.
    pub fn resolve(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| OutputError::MissingEntry(key.to_string()))
    }

    pub fn script_for(&self, chunk: &str) -> Option<&str> {
        self.get(&format!("{chunk}.js"))
    }

    pub fn stylesheet_for(&self, chunk: &str) -> Option<&str> {
        self.get(&format!("{chunk}.css"))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn to_json_pretty(&self) -> String {
        // A string map always serializes.
        serde_json::to_string_pretty(&self.0).unwrap_or_default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| OutputError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| OutputError::Manifest {
            path: path.to_path_buf(),
            source,
        })
    }
}

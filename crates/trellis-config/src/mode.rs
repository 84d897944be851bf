//! Build mode selection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether the process builds for local development or for shipping.
///
/// Decided once from the `NODE_ENV` signal: only the exact value
/// `"development"` selects [`BuildMode::Development`]. Any other value, and a
/// missing variable, fall back to production behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Development,
    #[default]
    Production,
}

impl BuildMode {
    /// Map the raw mode signal to a mode.
    pub fn from_signal(signal: Option<&str>) -> Self {
        match signal {
            Some("development") => BuildMode::Development,
            _ => BuildMode::Production,
        }
    }

    pub fn is_development(self) -> bool {
        self == BuildMode::Development
    }

    pub fn is_production(self) -> bool {
        self == BuildMode::Production
    }

    /// The environment string injected into application code.
    pub fn as_str(self) -> &'static str {
        match self {
            BuildMode::Development => "development",
            BuildMode::Production => "production",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_signal_selects_development() {
        assert_eq!(
            BuildMode::from_signal(Some("development")),
            BuildMode::Development
        );
    }

    #[test]
    fn anything_else_selects_production() {
        assert_eq!(BuildMode::from_signal(None), BuildMode::Production);
        assert_eq!(BuildMode::from_signal(Some("production")), BuildMode::Production);
        assert_eq!(BuildMode::from_signal(Some("test")), BuildMode::Production);
        assert_eq!(BuildMode::from_signal(Some("")), BuildMode::Production);
        // Matching is exact.
        assert_eq!(BuildMode::from_signal(Some("Development")), BuildMode::Production);
    }

    #[test]
    fn serializes_lowercase() {
        let value = serde_json::to_value(BuildMode::Development).unwrap();
        assert_eq!(value, serde_json::json!("development"));
        assert_eq!(BuildMode::Production.to_string(), "production");
    }
}

//! Raw settings gathered from defaults, `trellis.config.json`, the environment
//! and command-line overrides.
//!
//! Priority: overrides > environment > file > defaults.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format as _, Json, Serialized},
    Figment,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// File looked up in the working directory when no explicit path is given.
pub const CONFIG_FILE_NAME: &str = "trellis.config.json";

/// Backend port the development proxy forwards to when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 6969;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Settings {
    /// Mode signal, normally taken from `NODE_ENV`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_env: Option<String>,

    /// Backend port targeted by the development proxy (`PORT`)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Pinned revision identifier; skips the version-control lookup when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,

    /// Project file layout
    #[serde(default)]
    pub layout: ProjectLayout,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            node_env: None,
            port: DEFAULT_PORT,
            revision: None,
            layout: ProjectLayout::default(),
        }
    }
}

/// Where sources live and where bundles are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ProjectLayout {
    /// Browser bundle entry point
    pub client_entry: PathBuf,

    /// Root UI component, entry of the server-rendering bundle
    pub server_entry: PathBuf,

    /// Static-file root served by the backend
    pub static_root: PathBuf,

    /// Browser bundle directory, relative to `static_root`
    pub output_subdir: PathBuf,

    /// Server bundle directory
    pub server_output_dir: PathBuf,

    /// URL prefix under which browser assets are served
    pub public_path: String,

    /// Manifest file name inside the browser bundle directory
    pub manifest_name: String,

    /// Port of the development server itself
    pub dev_server_port: u16,
}

impl Default for ProjectLayout {
    fn default() -> Self {
        Self {
            client_entry: PathBuf::from("src/client/index.jsx"),
            server_entry: PathBuf::from("src/components/App.jsx"),
            static_root: PathBuf::from("static"),
            output_subdir: PathBuf::from("dist"),
            server_output_dir: PathBuf::from("build/ssr"),
            public_path: "/dist/".to_string(),
            manifest_name: "manifest.json".to_string(),
            dev_server_port: 8080,
        }
    }
}

impl ProjectLayout {
    /// Directory the browser bundle is emitted into.
    pub fn client_output_dir(&self) -> PathBuf {
        self.static_root.join(&self.output_subdir)
    }

    /// Fixed location of the asset manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.client_output_dir().join(&self.manifest_name)
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Settings {
    /// Build the provider stack without extracting it.
    ///
    /// `NODE_ENV` and `PORT` are read verbatim; any other key can be set with
    /// a `TRELLIS_` prefix, nested keys separated by `__`
    /// (`TRELLIS_LAYOUT__PUBLIC_PATH=/assets/`).
    pub fn figment(config_path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));

        match config_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Some(path) => figment = figment.merge(Json::file(path)),
            None => {
                let default_path = Path::new(CONFIG_FILE_NAME);
                if default_path.exists() {
                    figment = figment.merge(Json::file(default_path));
                }
            }
        }

        Ok(figment
            .merge(Env::raw().only(&["NODE_ENV", "PORT"]))
            .merge(Env::prefixed("TRELLIS_").split("__")))
    }

    /// Load settings, applying `overrides` on top of every other source.
    pub fn load<T: Serialize>(config_path: Option<&Path>, overrides: &T) -> Result<Self> {
        let figment = Self::figment(config_path)?.merge(Serialized::defaults(overrides));
        Self::from_figment(&figment)
    }

    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let settings: Settings = figment.extract()?;
        tracing::debug!(
            node_env = ?settings.node_env,
            port = settings.port,
            "settings loaded"
        );
        Ok(settings)
    }

    /// JSON schema for `trellis.config.json`.
    pub fn json_schema() -> Result<serde_json::Value> {
        let schema = schemars::schema_for!(Settings);
        serde_json::to_value(schema).map_err(|e| ConfigError::InvalidValue {
            field: "schema".to_string(),
            message: e.to_string(),
        })
    }

    /// Check values for logical consistency (no filesystem access).
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port".to_string(),
                message: "port must be between 1 and 65535".to_string(),
            });
        }

        let layout = &self.layout;
        if !layout.public_path.starts_with('/') || !layout.public_path.ends_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "layout.public_path".to_string(),
                message: format!(
                    "'{}' must start and end with '/'",
                    layout.public_path
                ),
            });
        }

        if layout.manifest_name.is_empty()
            || layout.manifest_name.contains(['/', '\\'])
        {
            return Err(ConfigError::InvalidValue {
                field: "layout.manifest_name".to_string(),
                message: format!("'{}' must be a plain file name", layout.manifest_name),
            });
        }

        if layout.client_output_dir() == layout.server_output_dir {
            return Err(ConfigError::InvalidValue {
                field: "layout.server_output_dir".to_string(),
                message: "server bundle must not share the browser bundle directory"
                    .to_string(),
            });
        }

        Ok(())
    }

    /// Check that both entry points exist under `root`.
    pub fn validate_entries(&self, root: &Path) -> Result<()> {
        for entry in [&self.layout.client_entry, &self.layout.server_entry] {
            let path = root.join(entry);
            if !path.is_file() {
                return Err(ConfigError::EntryNotFound(path));
            }
        }
        Ok(())
    }
}

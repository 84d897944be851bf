use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the resolved build descriptors as JSON
    ///
    /// This is the hand-off format for the bundler engine.
    Resolve(ResolveArgs),

    /// Emit staged modules with the resolved naming and chunk policy
    ///
    /// In production the output directory is cleaned first (keeping the
    /// manifest) and the server-rendering bundle can be emitted as well.
    Build(BuildArgs),

    /// Delete stale browser bundle output, keeping the manifest
    ///
    /// Only production builds clean; in development this is a no-op.
    Clean(CleanArgs),

    /// Validate settings and entry points
    Check(CheckArgs),
}

/// Overrides that take priority over the environment and the config file.
#[derive(Args, Debug, Clone, Default, Serialize)]
pub struct SettingsArgs {
    /// Path to the config file [default: ./trellis.config.json]
    #[arg(short, long, value_name = "FILE")]
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Build mode, instead of NODE_ENV
    #[arg(short, long, value_enum)]
    #[serde(rename = "node_env", skip_serializing_if = "Option::is_none")]
    pub mode: Option<ModeArg>,

    /// Backend port for the development proxy, instead of PORT
    #[arg(short, long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Revision identifier, instead of asking git
    #[arg(long, value_name = "REV")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

/// Serialized as the `NODE_ENV` value it stands for.
#[derive(ValueEnum, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModeArg {
    Development,
    Production,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Print JSON on a single line
    #[arg(long)]
    pub compact: bool,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Directory holding the compiled browser modules
    ///
    /// Files in sub-directories belong to the chunk named after the
    /// directory; top-level files belong to the entry chunk.
    #[arg(long, value_name = "DIR")]
    pub staging: PathBuf,

    /// Directory holding the compiled server-rendering modules
    ///
    /// Ignored outside production.
    #[arg(long, value_name = "DIR")]
    pub server_staging: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CleanArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Print the JSON schema of trellis.config.json and exit
    #[arg(long)]
    pub schema: bool,

    /// Skip checking that the entry files exist
    #[arg(long)]
    pub skip_entries: bool,
}

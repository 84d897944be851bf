//! Command-line interface definition.
//!
//! - `trellis resolve` - print the resolved descriptors as JSON
//! - `trellis build` - clean (production), then emit staged modules
//! - `trellis clean` - run the production cleanup on its own
//! - `trellis check` - validate settings and entry points

mod commands;

use clap::Parser;

pub use commands::{BuildArgs, CheckArgs, CleanArgs, Command, ModeArg, ResolveArgs, SettingsArgs};

/// Trellis - build configuration for a server-rendered React app
#[derive(Parser, Debug)]
#[command(
    name = "trellis",
    version,
    about = "Mode-aware build configuration for a server-rendered web app",
    long_about = "Trellis turns NODE_ENV, PORT and the current revision into the build\n\
                  descriptors handed to the bundler engine: a browser bundle, and in\n\
                  production a server-rendering bundle plus a cleanup of stale output."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

//! Trellis CLI - mode-aware build descriptors for a server-rendered web app.
//!
//! Parses arguments, initializes logging and dispatches to the command
//! implementations.

use clap::Parser;
use miette::Result;
use trellis_cli::{cli, commands, error, logger, ui};

fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Resolve(resolve_args) => commands::resolve_execute(resolve_args),
        cli::Command::Build(build_args) => commands::build_execute(build_args),
        cli::Command::Clean(clean_args) => commands::clean_execute(clean_args),
        cli::Command::Check(check_args) => commands::check_execute(check_args),
    };

    result.map_err(error::cli_error_to_miette)
}

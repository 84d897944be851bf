//! Conversion of CLI errors into `miette` reports.

use miette::Report;
use trellis_config::ConfigError;

use crate::error::CliError;

pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(e) => config_error_to_miette(e),
        other => miette::miette!("{}", other),
    }
}

fn config_error_to_miette(err: ConfigError) -> Report {
    match err {
        ConfigError::Load(e) => miette::miette!(
            help = "NODE_ENV, PORT and TRELLIS_* variables override trellis.config.json; check their values",
            "Failed to load configuration: {}",
            e
        ),
        ConfigError::NotFound(path) => miette::miette!(
            help = "Create trellis.config.json or drop --config to use defaults",
            "Config file not found: {}",
            path.display()
        ),
        ConfigError::EntryNotFound(path) => miette::miette!(
            help = "Set layout.client_entry / layout.server_entry in trellis.config.json",
            "Entry point not found: {}",
            path.display()
        ),
        other => miette::miette!("Configuration error: {}", other),
    }
}

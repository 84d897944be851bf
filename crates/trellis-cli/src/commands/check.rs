//! `trellis check`: validate settings and entry points without building.

use trellis_config::{resolve, BuildContext, FixedRevision, Settings};

use crate::cli::CheckArgs;
use crate::commands::utils;
use crate::error::Result;
use crate::ui;

pub fn execute(args: CheckArgs) -> Result<()> {
    if args.schema {
        let schema = Settings::json_schema()?;
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    ui::info("Checking configuration...");
    let settings = utils::load_settings(&args.settings)?;
    ui::success("Configuration is valid");

    if args.skip_entries {
        ui::warning("Skipping entry point checks");
    } else {
        let cwd = utils::get_cwd()?;
        settings.validate_entries(&cwd)?;
        for entry in [&settings.layout.client_entry, &settings.layout.server_entry] {
            ui::success(&format!("  {} exists", entry.display()));
        }
    }

    // Resolving needs no revision to prove the settings are usable.
    let ctx = BuildContext::from_settings(&settings, &FixedRevision::absent());
    let build = resolve(&ctx);
    ui::info(&format!(
        "{} mode: {} rules, {} plugins, server bundle {}",
        build.mode,
        build.client.rules.len(),
        build.client.plugins.len(),
        if build.server.is_some() { "enabled" } else { "disabled" }
    ));
    Ok(())
}

//! `trellis build`: emit staged modules as the final bundles.

use std::path::Path;
use std::time::Instant;

use trellis_config::resolve;
use trellis_output::{collect_staged, EmitPlan, EmitReport, Emitter, StagedModule};

use crate::cli::BuildArgs;
use crate::commands::{clean, utils};
use crate::error::Result;
use crate::ui;

/// Execute the build command.
///
/// 1. Load settings and freeze the build context
/// 2. Read the staged modules (nothing is touched if they are missing)
/// 3. Production only: clean the browser output directory
/// 4. Emit the browser bundle and manifest
/// 5. Production only: emit the server bundle when staged
pub fn execute(args: BuildArgs) -> Result<()> {
    let start_time = Instant::now();

    let ctx = utils::load_context(&args.settings)?;
    let build = resolve(&ctx);
    ui::info(&format!("Building for {}", build.mode));

    let cwd = utils::get_cwd()?;
    let client_modules = read_staging(
        &utils::resolve_path(&args.staging, &cwd),
        &build.client.entry.name,
    )?;

    let server_modules = match (&args.server_staging, &build.server) {
        (Some(dir), Some(server)) => Some((
            server,
            read_staging(&utils::resolve_path(dir, &cwd), &server.entry.name)?,
        )),
        (Some(_), None) => {
            ui::warning("The server bundle is only built in production; ignoring --server-staging");
            None
        }
        (None, _) => None,
    };

    if let Some(action) = &build.cleanup {
        ui::info(&format!("Cleaning {}", action.dir.display()));
        clean::run_cleanup(action)?;
    }

    let client_report = emit(EmitPlan::from(&build.client), &client_modules)?;
    ui::print_build_summary("Browser bundle", &client_report);

    if let Some((server, modules)) = server_modules {
        let server_report = emit(EmitPlan::from(server), &modules)?;
        ui::print_build_summary("Server bundle", &server_report);
    }

    ui::success(&format!(
        "Build completed in {}",
        ui::format_duration(start_time.elapsed())
    ));
    Ok(())
}

fn read_staging(dir: &Path, entry_chunk: &str) -> Result<Vec<StagedModule>> {
    let modules = collect_staged(dir, entry_chunk)?;
    if modules.is_empty() {
        ui::warning(&format!("No modules staged in {}", dir.display()));
    }
    Ok(modules)
}

fn emit(plan: EmitPlan, modules: &[StagedModule]) -> Result<EmitReport> {
    let report = Emitter::new(&plan)?.emit(modules)?;
    Ok(report)
}

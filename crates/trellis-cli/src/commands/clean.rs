//! `trellis clean`: the production pre-build cleanup on its own.

use trellis_config::{resolve, CleanupAction, CleanupReport};

use crate::cli::CleanArgs;
use crate::commands::utils;
use crate::error::{BuildError, Result};
use crate::ui;

pub fn execute(args: CleanArgs) -> Result<()> {
    let ctx = utils::load_context(&args.settings)?;
    let build = resolve(&ctx);

    match &build.cleanup {
        Some(action) => {
            let report = run_cleanup(action)?;
            ui::success(&format!(
                "Removed {} entries from {}",
                report.removed.len(),
                action.dir.display()
            ));
        }
        None => {
            tracing::info!(mode = %build.mode, "cleanup skipped");
            ui::info(&format!("Nothing to clean in {} mode", build.mode));
        }
    }
    Ok(())
}

/// Run `action`, surfacing its I/O error unchanged under the directory name.
pub(crate) fn run_cleanup(action: &CleanupAction) -> Result<CleanupReport> {
    action.execute().map_err(|source| {
        BuildError::CleanupFailed {
            dir: action.dir.clone(),
            source,
        }
        .into()
    })
}

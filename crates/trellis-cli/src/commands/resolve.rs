//! `trellis resolve`: descriptors as JSON on stdout.

use trellis_config::resolve;

use crate::cli::ResolveArgs;
use crate::commands::utils;
use crate::error::Result;

pub fn execute(args: ResolveArgs) -> Result<()> {
    let ctx = utils::load_context(&args.settings)?;
    let build = resolve(&ctx);

    let json = if args.compact {
        serde_json::to_string(&build)?
    } else {
        serde_json::to_string_pretty(&build)?
    };
    println!("{json}");
    Ok(())
}

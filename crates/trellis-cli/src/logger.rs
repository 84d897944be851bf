//! Logging setup for the Trellis CLI.
//!
//! Verbosity is chosen in this order: `--verbose` (debug), `--quiet` (errors
//! only), `RUST_LOG`, then info for the trellis crates. Everything is written
//! to stderr.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::ui::should_use_color;

const VERBOSE_FILTER: &str = "trellis=debug,trellis_cli=debug,trellis_config=debug,trellis_output=debug";
const QUIET_FILTER: &str = "error";
const DEFAULT_FILTER: &str = "trellis=info,trellis_cli=info,trellis_config=info,trellis_output=info";

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = filter_for(verbose, quiet);
    init_logger_with_filter(filter, no_color);
}

pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_color())
        .compact();

    // A second initialization (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

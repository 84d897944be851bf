//! Command implementations. Each module exposes an `execute` function taking
//! the parsed arguments.

pub mod build;
pub mod check;
pub mod clean;
pub mod resolve;
pub(crate) mod utils;

pub use build::execute as build_execute;
pub use check::execute as check_execute;
pub use clean::execute as clean_execute;
pub use resolve::execute as resolve_execute;

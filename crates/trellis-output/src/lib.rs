//! Output stage for Trellis.
//!
//! The external engine compiles sources and leaves per-chunk modules in a
//! staging directory. This crate applies a resolved descriptor's naming and
//! chunk policy to those modules, writes the final files and the asset
//! manifest, and reads the manifest back for server rendering.

pub mod emit;
pub mod error;
pub mod manifest;
pub mod staging;

pub use emit::{EmitPlan, EmitReport, EmittedFile, Emitter};
pub use error::{OutputError, Result};
pub use manifest::Manifest;
pub use staging::{collect_staged, StagedModule};

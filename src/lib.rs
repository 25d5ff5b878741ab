//! # createx
//!
//! A course-material build step. Splits every exercise's configuration module
//! into machine, viewer and repo registries without evaluating it, and
//! scaffolds a starter git repository for each exercise.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Settings and filesystem layout for a run
pub mod config;
/// A module defining a bunch of constant values to be used throughout
pub mod constants;
/// Exercise identifiers and discovery
pub mod exercise;
/// Thin wrapper over the `git` binary
pub mod git;
/// Renames packaging-mangled ignore files
pub mod ignore;
/// Parsing and source-to-source transformation of JavaScript config modules
pub mod js;
/// Ties every stage of a run together
pub mod pipeline;
/// Subprocess spawning with captured output
pub mod process;
/// Generated machine, viewer and repo registries
pub mod registry;
/// Per-exercise output directories and starter repositories
pub mod scaffold;
/// Utility functions for convenience
pub mod util;

pub use config::{Layout, Settings};
pub use pipeline::{Report, run};

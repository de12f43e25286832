//! Robocop core: parsing, linting and formatting of Robot Framework sources.
//!
//! The command line front end lives in `robocop-cli`; everything it needs is
//! exposed from here:
//!
//! - [`model`] parses `.robot` / `.resource` files into sections, blocks and statements
//! - [`linter`] holds the rule registry, rule selection, inline disablers and reports
//! - [`config`] resolves layered TOML configuration per source
//! - [`files`] implements exclusion patterns and `.gitignore` handling
//! - [`formatter`] rewrites sources through a pipeline of formatters

#[macro_use]
extern crate lazy_static;

pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod files;
pub mod formatter;
pub mod linter;
pub mod model;

pub use diagnostics::{Diagnostic, Severity};
pub use errors::{RobocopError, RobocopResult};

//! Command-line client for the Qordoba translation service.
//!
//! Source files are pushed for translation and finished translations are
//! pulled back into the local tree, with file names produced from configurable
//! patterns such as `i18n/<language_code>/<filename>.<extension>`.
//!
//! # Layout
//!
//! - [`i18n`]: languages and the code → language registry
//! - [`sources`]: naming patterns, content types and source file discovery
//! - [`paginate`]: lazy offset/limit listings
//! - [`api`]: the REST client
//! - [`config`]: the `.qordoba.yml` settings file
//! - [`commands`]: `init`, `status`, `ls`, `pull`, `push` and `delete`

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod i18n;
pub mod paginate;
pub mod prompt;
pub mod sources;
pub mod table;

pub use error::{Error, Result};

//! Language handling.
//!
//! - `language`: the [`Language`] value type and the raw [`LanguageRecord`] it is built from
//! - `registry`: the process-wide code → language table with primary-tag fallbacks
//!
//! # Example
//!
//! ```rust,ignore
//! use qordoba_cli::i18n::LanguageRegistry;
//!
//! let registry = LanguageRegistry::new();
//! registry.initialize(&api.get_languages().await?);
//!
//! let english = registry.normalize("en_US")?;
//! assert_eq!(english.code(), "en-us");
//! ```

mod language;
mod registry;

pub use language::{Language, LanguageRecord};
pub use registry::{LanguageRef, LanguageRegistry};

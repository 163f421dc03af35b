//! Language registry: lookup table from language codes to [`Language`]s.
//!
//! The table is built once per process from the service's full language list
//! and shared by reference (`Arc<LanguageRegistry>`) with every component that
//! resolves language codes. Rebuilding replaces the whole table in one swap,
//! so readers never see a half-built table.

use crate::error::{Error, Result};
use crate::i18n::{Language, LanguageRecord};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Region variant a bare primary tag resolves to.
///
/// Tags not listed here resolve to the first registered language carrying them.
const DEFAULT_LANGUAGE_COUNTRIES: &[(&str, &str)] = &[
    ("en", "en-us"),
    ("sv", "sv-se"),
    ("cy", "cy-az-az"),
    ("nl", "nl-nl"),
    ("it", "it-it"),
    ("bn", "bn-bn"),
    ("es", "es-es"),
    ("zh", "zh-cn"),
    ("fr", "fr-fr"),
];

fn default_country(lang: &str) -> Option<&'static str> {
    DEFAULT_LANGUAGE_COUNTRIES
        .iter()
        .find(|(tag, _)| *tag == lang)
        .map(|(_, code)| *code)
}

/// Input accepted by [`LanguageRegistry::normalize`].
#[derive(Debug, Clone, Copy)]
pub enum LanguageRef<'a> {
    /// Already resolved; returned as is.
    Resolved(&'a Language),
    /// Free text such as "en_US", "EN-GB" or "en".
    Code(&'a str),
}

impl<'a> From<&'a Language> for LanguageRef<'a> {
    fn from(language: &'a Language) -> Self {
        LanguageRef::Resolved(language)
    }
}

impl<'a> From<&'a str> for LanguageRef<'a> {
    fn from(code: &'a str) -> Self {
        LanguageRef::Code(code)
    }
}

impl<'a> From<&'a String> for LanguageRef<'a> {
    fn from(code: &'a String) -> Self {
        LanguageRef::Code(code.as_str())
    }
}

type LanguageTable = HashMap<String, Language>;

/// Registry of every language the service knows about.
#[derive(Debug, Default)]
pub struct LanguageRegistry {
    table: RwLock<Option<Arc<LanguageTable>>>,
}

impl LanguageRegistry {
    /// Create an empty, uninitialized registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry and initialize it in one step.
    pub fn with_languages<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a LanguageRecord>,
    {
        let registry = Self::new();
        registry.initialize(records);
        registry
    }

    /// Rebuild the table from raw service records.
    ///
    /// Every code is registered first. Then each primary tag that is not a
    /// code in its own right is bound to its default region variant when that
    /// variant is registered, or else to the first language seen with the tag.
    /// Calling this again replaces the previous table entirely.
    pub fn initialize<'a, I>(&self, records: I)
    where
        I: IntoIterator<Item = &'a LanguageRecord>,
    {
        let languages: Vec<Language> = records.into_iter().map(Language::from_record).collect();

        let mut table: LanguageTable = HashMap::with_capacity(languages.len() * 2);
        for language in &languages {
            table.insert(language.code().to_string(), language.clone());
        }

        for language in &languages {
            let tag = language.lang();
            if table.contains_key(tag) {
                continue;
            }

            let target = default_country(tag)
                .and_then(|code| table.get(code))
                .cloned()
                .unwrap_or_else(|| language.clone());
            table.insert(tag.to_string(), target);
        }

        debug!(
            "Language registry initialized with {} languages ({} keys)",
            languages.len(),
            table.len()
        );

        let mut slot = self.table.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::new(table));
    }

    /// Whether `initialize` has run.
    pub fn is_initialized(&self) -> bool {
        self.snapshot().is_some()
    }

    /// Resolve free text (or pass through an already-resolved language).
    ///
    /// Text is lowercased and underscores become hyphens before the lookup,
    /// so "en_US" and "EN-US" both resolve to "en-us".
    ///
    /// # Errors
    /// * [`Error::RegistryUninitialized`] when `initialize` never ran, whatever the input
    /// * [`Error::LanguageNotFound`] when the code is unknown
    pub fn normalize<'a>(&self, input: impl Into<LanguageRef<'a>>) -> Result<Language> {
        let table = self.snapshot().ok_or(Error::RegistryUninitialized)?;

        match input.into() {
            LanguageRef::Resolved(language) => Ok(language.clone()),
            LanguageRef::Code(code) => {
                let key = code.replace('_', "-").to_lowercase();
                table
                    .get(&key)
                    .cloned()
                    .ok_or(Error::LanguageNotFound(key))
            }
        }
    }

    /// Whether `language` is what its bare primary tag resolves to.
    pub fn is_default_variant(&self, language: &Language) -> Result<bool> {
        let table = self.snapshot().ok_or(Error::RegistryUninitialized)?;
        Ok(table.get(language.lang()) == Some(language))
    }

    fn snapshot(&self) -> Option<Arc<LanguageTable>> {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(id: u64, code: &str, name: &str) -> LanguageRecord {
        LanguageRecord {
            id,
            code: code.to_string(),
            name: name.to_string(),
            direction: None,
        }
    }

    fn sample_records() -> Vec<LanguageRecord> {
        vec![
            record(92, "en-gb", "English - United Kingdom"),
            record(94, "en-us", "English - United States"),
            record(110, "fr-fr", "French - France"),
            record(108, "fr-ca", "French - Canada"),
            record(190, "ru-ru", "Russian - Russia"),
            record(150, "ja-jp", "Japanese - Japan"),
            record(46, "zh-cn", "Chinese - China"),
            record(301, "pt-br", "Portuguese - Brazil"),
            record(302, "pt-pt", "Portuguese - Portugal"),
        ]
    }

    // ==================== Initialization Tests ====================

    #[test]
    fn test_new_registry_is_uninitialized() {
        let registry = LanguageRegistry::new();
        assert!(!registry.is_initialized());
    }

    #[test]
    fn test_normalize_before_initialize_fails() {
        let registry = LanguageRegistry::new();
        let lang = Language::from_record(&record(94, "en-us", "English"));

        assert!(matches!(registry.normalize("en-us"), Err(Error::RegistryUninitialized)));
        assert!(matches!(registry.normalize(""), Err(Error::RegistryUninitialized)));
        assert!(matches!(registry.normalize(&lang), Err(Error::RegistryUninitialized)));
    }

    #[test]
    fn test_initialize_replaces_previous_table() {
        let registry = LanguageRegistry::with_languages(&sample_records());
        assert!(registry.normalize("ru-ru").is_ok());

        registry.initialize(&[record(1, "de-de", "German - Germany")]);
        assert!(matches!(registry.normalize("ru-ru"), Err(Error::LanguageNotFound(_))));
        assert_eq!(registry.normalize("de").unwrap().code(), "de-de");
    }

    // ==================== normalize Tests ====================

    #[test]
    fn test_normalize_underscore_and_case() {
        let registry = LanguageRegistry::with_languages(&sample_records());

        assert_eq!(registry.normalize("en_US").unwrap().code(), "en-us");
        assert_eq!(registry.normalize("EN-GB").unwrap().code(), "en-gb");
    }

    #[test]
    fn test_normalize_primary_tag_uses_default_country() {
        let registry = LanguageRegistry::with_languages(&sample_records());

        // en-gb comes first in the list but en-us is the configured default
        assert_eq!(registry.normalize("en").unwrap().code(), "en-us");
        assert_eq!(registry.normalize("fr").unwrap().code(), "fr-fr");
        assert_eq!(registry.normalize("zh").unwrap().code(), "zh-cn");
    }

    #[test]
    fn test_normalize_primary_tag_without_default_uses_first_seen() {
        let registry = LanguageRegistry::with_languages(&sample_records());
        assert_eq!(registry.normalize("pt").unwrap().code(), "pt-br");
    }

    #[test]
    fn test_default_country_missing_from_list_falls_back() {
        let registry = LanguageRegistry::with_languages(&[
            record(1, "es-mx", "Spanish - Mexico"),
            record(2, "es-ar", "Spanish - Argentina"),
        ]);
        assert_eq!(registry.normalize("es").unwrap().code(), "es-mx");
    }

    #[test]
    fn test_normalize_not_found() {
        let registry = LanguageRegistry::with_languages(&sample_records());

        assert!(matches!(registry.normalize("ed-ed"), Err(Error::LanguageNotFound(_))));
        assert!(matches!(registry.normalize(""), Err(Error::LanguageNotFound(_))));
    }

    #[test]
    fn test_normalize_resolved_language_passes_through() {
        let registry = LanguageRegistry::with_languages(&sample_records());
        let unknown = Language::from_record(&record(7, "xx-xx", "Unknown"));

        let resolved = registry.normalize(&unknown).unwrap();
        assert_eq!(resolved, unknown);
        assert_eq!(resolved.id(), 7);
    }

    #[test]
    fn test_is_default_variant() {
        let registry = LanguageRegistry::with_languages(&sample_records());
        let us = registry.normalize("en-us").unwrap();
        let gb = registry.normalize("en-gb").unwrap();

        assert!(registry.is_default_variant(&us).unwrap());
        assert!(!registry.is_default_variant(&gb).unwrap());
    }

    // ==================== Property Tests ====================

    proptest! {
        #[test]
        fn prop_primary_tag_resolution_is_stable(order in Just(sample_records()).prop_shuffle()) {
            let registry = LanguageRegistry::with_languages(&order);
            for tag in ["en", "fr", "ru", "ja", "zh", "pt"] {
                let first = registry.normalize(tag).unwrap();
                let second = registry.normalize(tag).unwrap();
                prop_assert_eq!(first.lang(), tag);
                prop_assert_eq!(first, second);
            }
        }

        #[test]
        fn prop_every_registered_code_round_trips(idx in 0usize..9) {
            let records = sample_records();
            let registry = LanguageRegistry::with_languages(&records);
            let code = records[idx].code.clone();
            let normalized = registry.normalize(&code.to_uppercase().replace('-', "_")).unwrap();
            prop_assert_eq!(normalized.code(), code.as_str());
        }
    }
}

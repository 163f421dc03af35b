//! Language type: a region-qualified language known to the service.
//!
//! Languages are built from the raw records the service returns and are
//! immutable afterwards. Two languages are equal when their codes are equal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Raw language record as returned by the service.
///
/// Example: `{"id": 94, "name": "English - United States", "code": "en-US"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageRecord {
    pub id: u64,
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

/// A language resolved from a [`LanguageRecord`].
#[derive(Debug, Clone)]
pub struct Language {
    /// Lowercase, region-qualified code (e.g. "en-us")
    code: String,
    id: u64,
    /// Display name without the region qualifier (e.g. "English")
    name: String,
    /// Code before the first '-' (e.g. "en")
    lang: String,
}

impl Language {
    /// Build a language from a raw service record.
    ///
    /// The code is lowercased and the display name loses its region qualifier:
    /// "French - France" becomes "French".
    pub fn from_record(record: &LanguageRecord) -> Language {
        let code = record.code.to_lowercase();
        let lang = code.split('-').next().unwrap_or_default().to_string();
        let name = record
            .name
            .split('-')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();

        Language {
            code,
            id: record.id,
            name,
            lang,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Primary tag: the language-only part of the code.
    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display name with the first character uppercased and the rest lowercased.
    pub fn name_capitalized(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        }
    }

    pub fn name_uppercased(&self) -> String {
        self.name.to_uppercase()
    }
}

impl From<&LanguageRecord> for Language {
    fn from(record: &LanguageRecord) -> Self {
        Language::from_record(record)
    }
}

impl PartialEq for Language {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Language {}

impl Hash for Language {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

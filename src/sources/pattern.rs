//! File naming patterns.
//!
//! A pattern is a relative path with `<token>` placeholders, e.g.
//! `config/locales/server.<language_code>.yml`. Pull patterns are expanded
//! into the local path of a translation; push patterns are globs (they may
//! also carry language tokens) used to discover source files.

use crate::error::{Error, Result};
use crate::i18n::Language;
use regex::{Captures, Regex};
use std::fmt;
use std::sync::OnceLock;

/// Pattern used for pulled files when the settings define none.
pub const DEFAULT_PULL_PATTERN: &str = "<language_code>.<extension>";

/// Placeholders recognised inside patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternToken {
    /// `<language_code>`: "fr-fr"
    LanguageCode,
    /// `<language_lang_code>`: "fr"
    LanguageLangCode,
    /// `<language_name>`: "French"
    LanguageName,
    /// `<language_name_cap>`: "French"
    LanguageNameCap,
    /// `<language_name_allcap>`: "FRENCH"
    LanguageNameAllcap,
    /// `<filename>`: source name before the first '.'
    Filename,
    /// `<extension>`: source name after the first '.'
    Extension,
}

impl PatternToken {
    pub const ALL: [PatternToken; 7] = [
        PatternToken::LanguageCode,
        PatternToken::LanguageName,
        PatternToken::LanguageNameCap,
        PatternToken::LanguageNameAllcap,
        PatternToken::LanguageLangCode,
        PatternToken::Filename,
        PatternToken::Extension,
    ];

    /// Tokens a push pattern may use to select the source language's files.
    pub const PUSH: [PatternToken; 2] = [PatternToken::LanguageCode, PatternToken::LanguageLangCode];

    pub fn name(self) -> &'static str {
        match self {
            PatternToken::LanguageCode => "language_code",
            PatternToken::LanguageLangCode => "language_lang_code",
            PatternToken::LanguageName => "language_name",
            PatternToken::LanguageNameCap => "language_name_cap",
            PatternToken::LanguageNameAllcap => "language_name_allcap",
            PatternToken::Filename => "filename",
            PatternToken::Extension => "extension",
        }
    }

    pub fn from_name(name: &str) -> Option<PatternToken> {
        PatternToken::ALL.into_iter().find(|token| token.name() == name)
    }
}

impl fmt::Display for PatternToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.name())
    }
}

/// Which way a pattern is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Local source files are globbed and uploaded.
    Push,
    /// Translations are downloaded to the expanded path.
    Pull,
}

fn token_regex() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| {
        let names: Vec<&str> = PatternToken::ALL.iter().map(|t| t.name()).collect();
        Regex::new(&format!("<({})>", names.join("|"))).expect("token pattern is a valid regex")
    })
}

/// Tokens present in `pattern`, in order of appearance.
pub fn tokens_in(pattern: &str) -> Vec<PatternToken> {
    token_regex()
        .captures_iter(pattern)
        .filter_map(|caps| PatternToken::from_name(&caps[1]))
        .collect()
}

/// Whether `pattern` contains a glob wildcard.
pub fn has_glob_magic(pattern: &str) -> bool {
    pattern.contains(|c| c == '*' || c == '?')
}

/// Check that a push pattern can select files.
///
/// Purely syntactic: the filesystem is not touched.
///
/// # Errors
/// [`Error::PatternInvalid`] when the pattern has no `*` or `?`.
pub fn validate_push_pattern(pattern: &str) -> Result<()> {
    if !has_glob_magic(pattern) {
        return Err(Error::PatternInvalid(
            "Push pattern is not valid. Pattern should contain one of the values: *,?".to_string(),
        ));
    }
    Ok(())
}

/// Check that a pull pattern contains at least one recognised token.
pub fn validate_pull_pattern(pattern: &str) -> Result<()> {
    if tokens_in(pattern).is_empty() {
        let allowed: Vec<&str> = PatternToken::ALL.iter().map(|t| t.name()).collect();
        return Err(Error::PatternInvalid(format!(
            "Pull pattern is not valid. Pattern should contain one of the values: {}",
            allowed.join(", ")
        )));
    }
    Ok(())
}

/// Split a file name at its first '.': `"a.b.json"` gives `("a", "b.json")`.
pub fn split_file_name(name: &str) -> (&str, &str) {
    name.split_once('.').unwrap_or((name, ""))
}

/// Substitute tokens in one left-to-right pass.
///
/// File tokens are left untouched when `file_parts` is `None`.
fn substitute(pattern: &str, language: &Language, file_parts: Option<(&str, &str)>) -> String {
    token_regex()
        .replace_all(pattern, |caps: &Captures<'_>| {
            let Some(token) = PatternToken::from_name(&caps[1]) else {
                return caps[0].to_string();
            };
            match (token, file_parts) {
                (PatternToken::LanguageCode, _) => language.code().to_string(),
                (PatternToken::LanguageLangCode, _) => language.lang().to_string(),
                (PatternToken::LanguageName, _) => language.name().to_string(),
                (PatternToken::LanguageNameCap, _) => language.name_capitalized(),
                (PatternToken::LanguageNameAllcap, _) => language.name_uppercased(),
                (PatternToken::Filename, Some((stem, _))) => stem.to_string(),
                (PatternToken::Extension, Some((_, extension))) => extension.to_string(),
                (PatternToken::Filename | PatternToken::Extension, None) => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Replace only the language tokens of `pattern`.
pub fn expand_language_tokens(pattern: &str, language: &Language) -> String {
    substitute(pattern, language, None)
}

/// Expand `pattern` for `language` and the remote source file `source_name`.
///
/// Pull patterns must contain at least one token. `<filename>` and
/// `<extension>` come from splitting `source_name` at its first '.'.
///
/// # Example
/// ```rust,ignore
/// // language ru-ru, source "segments.json"
/// expand_pattern("<language_code>.<extension>", &ru, "segments.json", Direction::Pull)?;
/// // -> "ru-ru.json"
/// ```
pub fn expand_pattern(
    pattern: &str,
    language: &Language,
    source_name: &str,
    direction: Direction,
) -> Result<String> {
    if direction == Direction::Pull {
        validate_pull_pattern(pattern)?;
    }
    Ok(substitute(pattern, language, Some(split_file_name(source_name))))
}

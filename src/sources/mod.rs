//! Local translation files.
//!
//! - `pattern`: push/pull naming patterns and token expansion
//! - `content_type`: extension → upload content type
//!
//! This module holds [`TranslationFile`], the path value tying a file on disk
//! to a language, plus push-time discovery of source files.

pub mod content_type;
pub mod pattern;

use crate::error::{Error, Result};
use crate::i18n::{Language, LanguageRef, LanguageRegistry};
use regex::Regex;
use std::fmt;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR, MAIN_SEPARATOR_STR};
use tracing::debug;
use walkdir::WalkDir;

pub use content_type::{content_type_for, mimetype};
pub use pattern::{
    expand_pattern, validate_pull_pattern, validate_push_pattern, Direction, PatternToken,
    DEFAULT_PULL_PATTERN,
};

fn is_separator(c: char) -> bool {
    c == '/' || c == MAIN_SEPARATOR
}

/// A file relative to a base directory, written in one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationFile {
    relpath: String,
    language: Language,
    base_dir: PathBuf,
}

impl TranslationFile {
    pub fn new(relpath: impl Into<String>, language: Language, base_dir: impl Into<PathBuf>) -> Self {
        TranslationFile {
            relpath: relpath.into(),
            language,
            base_dir: base_dir.into(),
        }
    }

    pub fn relpath(&self) -> &str {
        &self.relpath
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Final path component.
    pub fn name(&self) -> &str {
        self.relpath.rsplit(is_separator).next().unwrap_or_default()
    }

    /// Everything after the first '.' of the file name.
    pub fn extension(&self) -> Option<&str> {
        self.name().split_once('.').map(|(_, extension)| extension)
    }

    /// The relative path with '/' separators.
    pub fn posix_path(&self) -> String {
        self.relpath.replace(MAIN_SEPARATOR, "/")
    }

    /// The relative path with the platform's separators.
    pub fn native_path(&self) -> PathBuf {
        PathBuf::from(self.relpath.replace('/', MAIN_SEPARATOR_STR))
    }

    pub fn full_path(&self) -> PathBuf {
        self.base_dir.join(self.native_path())
    }

    /// Name the service knows the file by.
    pub fn unique_name(&self) -> &str {
        self.name()
    }

    /// Same directory, different file name.
    pub fn with_file_name(&self, name: &str) -> TranslationFile {
        let relpath = match self.relpath.rfind(is_separator) {
            Some(idx) => format!("{}{}", &self.relpath[..=idx], name),
            None => name.to_string(),
        };
        TranslationFile::new(relpath, self.language.clone(), self.base_dir.clone())
    }
}

impl fmt::Display for TranslationFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `path` expressed relative to `base`, both made absolute first.
fn relative_to(path: &Path, base: &Path) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    let path = cwd.join(path);
    let base = cwd.join(base);

    let path: Vec<Component<'_>> = path.components().filter(|c| *c != Component::CurDir).collect();
    let base: Vec<Component<'_>> = base.components().filter(|c| *c != Component::CurDir).collect();
    let common = path.iter().zip(&base).take_while(|(a, b)| a == b).count();

    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for component in &path[common..] {
        relative.push(component.as_os_str());
    }
    Ok(relative)
}

/// Build a [`TranslationFile`] from a raw path and a language.
///
/// Absolute paths are made relative to `base_dir`; relative paths are kept as
/// they are. The language is resolved through `registry` first.
///
/// # Errors
/// Whatever [`LanguageRegistry::normalize`] reports for the language.
pub fn resolve_relative_path<'a>(
    registry: &LanguageRegistry,
    base_dir: &Path,
    raw_path: &Path,
    language: impl Into<LanguageRef<'a>>,
) -> Result<TranslationFile> {
    let language = registry.normalize(language)?;
    let relpath = if raw_path.is_absolute() {
        relative_to(raw_path, base_dir)?
    } else {
        raw_path.to_path_buf()
    };
    Ok(TranslationFile::new(
        relpath.to_string_lossy().into_owned(),
        language,
        base_dir,
    ))
}

/// A push pattern compiled for a directory walk.
#[derive(Debug)]
struct GlobMatcher {
    regex: Regex,
    /// Per pattern segment: whether it starts with '.' and may match hidden names.
    dotted: Vec<bool>,
    root: PathBuf,
    max_depth: usize,
    absolute: bool,
}

fn has_magic(segment: &str) -> bool {
    segment.contains(|c| c == '*' || c == '?' || c == '[')
}

/// Translate one glob into regex syntax.
fn glob_to_regex(glob: &str) -> String {
    let chars: Vec<char> = glob.chars().collect();
    let mut out = String::from("^");
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '[' => {
                let mut j = i + 1;
                if j < chars.len() && chars[j] == '!' {
                    j += 1;
                }
                if j < chars.len() && chars[j] == ']' {
                    j += 1;
                }
                while j < chars.len() && chars[j] != ']' {
                    j += 1;
                }
                if j >= chars.len() {
                    out.push_str(r"\[");
                } else {
                    let mut class: String = chars[i + 1..j].iter().collect();
                    if let Some(rest) = class.strip_prefix('!') {
                        class = format!("^{rest}");
                    }
                    out.push('[');
                    out.push_str(&class.replace('\\', r"\\").replace('[', r"\["));
                    out.push(']');
                    i = j;
                }
            }
            c => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }
    out.push('$');
    out
}

impl GlobMatcher {
    fn compile(base_dir: &Path, pattern: &str) -> Result<GlobMatcher> {
        let mut pattern = pattern.replace(MAIN_SEPARATOR, "/");
        while let Some(rest) = pattern.strip_prefix("./") {
            pattern = rest.to_string();
        }
        let absolute = pattern.starts_with('/');

        let segments: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
        let literal = segments.iter().take_while(|s| !has_magic(s)).count();
        let prefix = segments[..literal].join("/");
        let root = if absolute {
            PathBuf::from(format!("/{prefix}"))
        } else {
            base_dir.join(&prefix)
        };

        let regex = Regex::new(&glob_to_regex(pattern.trim_start_matches('/')))
            .map_err(|e| Error::PatternInvalid(format!("Push pattern is not valid: {e}")))?;

        Ok(GlobMatcher {
            regex,
            dotted: segments.iter().map(|s| s.starts_with('.')).collect(),
            root,
            max_depth: segments.len() - literal,
            absolute,
        })
    }

    /// Wildcards never match a leading '.' of a path segment.
    fn matches(&self, candidate: &str) -> bool {
        let visible = candidate
            .split('/')
            .filter(|s| !s.is_empty())
            .zip(&self.dotted)
            .all(|(segment, &dotted)| dotted || !segment.starts_with('.'));
        visible && self.regex.is_match(candidate)
    }
}

fn to_posix(path: &Path) -> String {
    path.to_string_lossy().replace(MAIN_SEPARATOR, "/")
}

/// Find the source files selected by a push pattern.
///
/// Language tokens in the pattern are replaced with `language` before the
/// glob runs, so `i18n/<language_code>/*.json` selects the source language's
/// files. Directories, dot-files and files with an unsupported extension are
/// skipped. Relative patterns are matched below `base_dir`.
///
/// # Errors
/// * [`Error::PatternInvalid`] when the pattern has no wildcard
/// * whatever the registry reports for `language`
pub fn discover_files(
    registry: &LanguageRegistry,
    base_dir: &Path,
    pattern: &str,
    language: &Language,
) -> Result<impl Iterator<Item = TranslationFile>> {
    validate_push_pattern(pattern)?;
    let language = registry.normalize(language)?;
    let expanded = pattern::expand_language_tokens(pattern, &language);
    let matcher = GlobMatcher::compile(base_dir, &expanded)?;
    let base_dir = base_dir.to_path_buf();

    debug!(
        "Searching files for pattern `{}` under {}",
        expanded,
        matcher.root.display()
    );

    let entries = WalkDir::new(&matcher.root)
        .follow_links(true)
        .max_depth(matcher.max_depth)
        .sort_by_file_name()
        .into_iter();

    Ok(entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| !entry.file_type().is_dir())
        .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
        .filter_map(move |entry| {
            let path = entry.path();
            let candidate = if matcher.absolute {
                to_posix(path).trim_start_matches('/').to_string()
            } else {
                to_posix(path.strip_prefix(&base_dir).unwrap_or(path))
            };
            if !matcher.matches(&candidate) {
                return None;
            }

            let relpath = if matcher.absolute {
                relative_to(path, &base_dir).ok()?
            } else {
                PathBuf::from(&candidate)
            };
            let file = TranslationFile::new(
                relpath.to_string_lossy().into_owned(),
                language.clone(),
                base_dir.clone(),
            );

            match content_type_for(file.extension()) {
                Ok(_) => Some(file),
                Err(e) => {
                    debug!("Skipping {}: {}", file.posix_path(), e);
                    None
                }
            }
        }))
}

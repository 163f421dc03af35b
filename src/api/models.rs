//! Request and response bodies of the service API.

use crate::error::{Error, Result};
use crate::i18n::{Language, LanguageRecord};
use crate::paginate::PageMeta;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Milestone id meaning "latest completed" in export requests.
pub const DEFAULT_MILESTONE_ID: i64 = -100;

// ==================== Envelopes ====================

#[derive(Debug, Deserialize)]
pub(crate) struct LanguagesEnvelope {
    pub languages: Vec<LanguageRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectEnvelope {
    pub project: ProjectRecord,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectsEnvelope {
    pub projects: Vec<ProjectRecord>,
    pub meta: PageMeta,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PagesEnvelope {
    pub pages: Vec<PageRecord>,
    pub meta: PageMeta,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageEnvelope {
    pub page: PageDetails,
}

// ==================== Projects ====================

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectRecord {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    pub source_language: LanguageRecord,
    #[serde(default)]
    pub target_languages: Vec<LanguageRecord>,
}

/// A project's languages, fetched fresh by each command.
#[derive(Debug, Clone)]
pub struct Project {
    pub id: u64,
    pub name: Option<String>,
    pub source_language: Language,
    pub target_languages: Vec<Language>,
}

impl Project {
    /// The target language listings and searches are scoped to.
    pub fn first_target(&self) -> Result<&Language> {
        self.target_languages.first().ok_or(Error::NoTargetLanguages)
    }
}

impl From<ProjectRecord> for Project {
    fn from(record: ProjectRecord) -> Self {
        Project {
            id: record.id,
            name: record.name,
            source_language: Language::from_record(&record.source_language),
            target_languages: record.target_languages.iter().map(Language::from_record).collect(),
        }
    }
}

// ==================== Pages ====================

/// Status filter for page searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    Enabled,
    Completed,
    Preparing,
    Disabled,
}

/// One row of a page search.
#[derive(Debug, Clone, Deserialize)]
pub struct PageRecord {
    pub id: u64,
    pub page_id: u64,
    pub url: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub preparing: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub error_id: Option<i64>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub segment_count: u64,
    /// Last update, epoch milliseconds.
    #[serde(default)]
    pub update: Option<i64>,
    #[serde(default)]
    pub version_tag: Option<String>,
}

/// Human status shown by `ls`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Error,
    Preparing,
    Completed,
    Enabled,
    Disabled,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileStatus::Error => "Error",
            FileStatus::Preparing => "Preparing...",
            FileStatus::Completed => "Completed",
            FileStatus::Enabled => "Enabled",
            FileStatus::Disabled => "Disabled",
        })
    }
}

impl PageRecord {
    /// `url`, followed by `[tag]` when the page carries a version tag.
    pub fn display_name(&self) -> String {
        match self.version_tag.as_deref().filter(|tag| !tag.is_empty()) {
            Some(tag) => format!("{} [{}]", self.url, tag),
            None => self.url.clone(),
        }
    }

    /// Checked in order: error, preparing, completed, enabled.
    pub fn status(&self) -> FileStatus {
        if self.error_id.is_some_and(|id| id != 0) {
            FileStatus::Error
        } else if self.preparing {
            FileStatus::Preparing
        } else if self.enabled && self.completed {
            FileStatus::Completed
        } else if self.enabled {
            FileStatus::Enabled
        } else {
            FileStatus::Disabled
        }
    }

    pub fn updated_on(&self) -> Option<DateTime<Utc>> {
        self.update.and_then(DateTime::from_timestamp_millis)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MilestoneRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageDetails {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub content_type_code: Option<String>,
    #[serde(default)]
    pub status: Option<MilestoneRef>,
}

/// Body of a page search request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchFilter {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub status: Vec<PageStatus>,
    #[serde(rename = "title", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl SearchFilter {
    pub fn with_status(status: &[PageStatus]) -> Self {
        SearchFilter {
            status: status.to_vec(),
            title: None,
        }
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        SearchFilter {
            status: Vec::new(),
            title: Some(title.into()).filter(|t: &String| !t.is_empty()),
        }
    }
}

// ==================== Progress ====================

#[derive(Debug, Clone, Deserialize)]
pub struct ProgressReport {
    pub languages: Vec<LanguageProgress>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageProgress {
    pub code: String,
    #[serde(default)]
    pub total_words: u64,
    #[serde(default)]
    pub segments: u64,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Milestone {
    pub id: i64,
    pub name: String,
    pub order: i64,
    /// Kept as sent, so `16.67` and `0` print the way the service wrote them.
    pub percent: serde_json::Number,
}

impl LanguageProgress {
    /// Milestones by ascending `order`.
    pub fn sorted_milestones(&self) -> Vec<&Milestone> {
        let mut milestones: Vec<&Milestone> = self.milestones.iter().collect();
        milestones.sort_by_key(|m| m.order);
        milestones
    }
}

// ==================== Uploads ====================

#[derive(Debug, Clone, Deserialize)]
pub struct Column {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub empty: bool,
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.empty {
            write!(f, "{} (empty)", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub upload_id: String,
    #[serde(default)]
    pub version_tags: Vec<String>,
    #[serde(default)]
    pub columns: Option<Vec<Column>>,
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUploadResponse {
    pub id: serde_json::Value,
}

/// Columns chosen for a tabular upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSelection {
    pub source_columns: Vec<i64>,
    pub reference_column: Option<i64>,
}

/// One entry of an append request.
#[derive(Debug, Clone, Serialize)]
pub struct AppendFile {
    pub id: String,
    pub file_name: String,
    pub source_columns: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_columns: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_tag: Option<String>,
}

impl AppendFile {
    pub fn new(upload_id: &str, file_name: &str, columns: ColumnSelection, version_tag: Option<String>) -> Self {
        AppendFile {
            id: upload_id.to_string(),
            file_name: file_name.to_string(),
            source_columns: columns.source_columns,
            reference_columns: columns.reference_column,
            version_tag,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ExportResponse {
    pub token: String,
    pub filename: String,
}

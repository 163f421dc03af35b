//! Typed access to the translation service's REST API.
//!
//! - `client`: [`ProjectApi`], one method per endpoint, plus the paginated listings
//! - `models`: request and response bodies

mod client;
pub mod models;

pub use client::{PageSearch, ProjectApi, ProjectListing};
pub use models::{
    AppendFile, Column, ColumnSelection, FileStatus, LanguageProgress, Milestone, PageDetails, PageRecord,
    PageStatus, ProgressReport, Project, SearchFilter, UploadResponse, DEFAULT_MILESTONE_ID,
};

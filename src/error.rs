//! Error taxonomy shared by the library modules.
//!
//! Commands and the binary wrap these in `anyhow::Error`; code that needs to
//! react to a specific failure (a naming conflict during push, for example)
//! matches on [`Error`] before it is converted.

use std::path::PathBuf;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The language registry was queried before `initialize` ran.
    #[error("language registry is not initialized")]
    RegistryUninitialized,

    #[error("Language `{0}` not found.")]
    LanguageNotFound(String),

    /// A push or pull pattern failed validation.
    #[error("{0}")]
    PatternInvalid(String),

    #[error("File format `{extension}` not in allowed list of file formats: {allowed}")]
    UnsupportedExtension { extension: String, allowed: String },

    #[error("{0}")]
    FilesNotFound(String),

    #[error("File {file_name} with version {version} not found")]
    VersionNotFound { file_name: String, version: String },

    /// Non-2xx response from the service.
    #[error("{message}")]
    Remote {
        message: String,
        payload: Option<serde_json::Value>,
    },

    /// Non-2xx response whose message reports a naming conflict.
    #[error("{message}")]
    AlreadyExists {
        message: String,
        payload: Option<serde_json::Value>,
    },

    #[error("{0} param is required. Please provide it by argument or in config file.")]
    SettingsMissing(String),

    #[error("Could not parse config file: {path}: {reason}")]
    SettingsInvalid { path: PathBuf, reason: String },

    #[error("Config file already exists: {0}")]
    SettingsExist(PathBuf),

    #[error("Selected languages not configured in project as target languages: `{0}`")]
    LanguageNotInProject(String),

    #[error("project has no target languages")]
    NoTargetLanguages,

    /// A paginated listing was asked for one item and had none.
    #[error("no results")]
    NoResults,

    #[error("input closed while waiting for an answer")]
    PromptClosed,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid API url: {0}")]
    Url(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to serialize settings: {0}")]
    Yaml(#[from] serde_yml::Error),
}

impl Error {
    /// Whether the service rejected the request because the resource name is taken.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::AlreadyExists { .. })
    }

    /// Structured body attached to a remote failure, if the service sent one.
    pub fn payload(&self) -> Option<&serde_json::Value> {
        match self {
            Error::Remote { payload, .. } | Error::AlreadyExists { payload, .. } => {
                payload.as_ref()
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_exists_is_detected() {
        let err = Error::AlreadyExists {
            message: "File already exists".to_string(),
            payload: None,
        };
        assert!(err.is_already_exists());

        let err = Error::Remote {
            message: "Bad request".to_string(),
            payload: None,
        };
        assert!(!err.is_already_exists());
    }

    #[test]
    fn test_payload_is_exposed_for_remote_errors() {
        let body = serde_json::json!({"errMessage": "boom"});
        let err = Error::Remote {
            message: "boom".to_string(),
            payload: Some(body.clone()),
        };
        assert_eq!(err.payload(), Some(&body));
        assert!(Error::NoResults.payload().is_none());
    }

    #[test]
    fn test_settings_missing_message_names_key() {
        let err = Error::SettingsMissing("project_id".to_string());
        assert!(err.to_string().starts_with("project_id param is required"));
    }

    #[test]
    fn test_uninitialized_and_not_found_are_distinct() {
        let uninit = Error::RegistryUninitialized;
        let missing = Error::LanguageNotFound(String::new());
        assert!(matches!(uninit, Error::RegistryUninitialized));
        assert!(matches!(missing, Error::LanguageNotFound(_)));
        assert_ne!(uninit.to_string(), missing.to_string());
    }
}

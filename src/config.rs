//! Settings file handling.
//!
//! Settings live in a YAML document under a top-level `qordoba` key:
//!
//! ```yaml
//! qordoba:
//!   access_token: 0c3b8e2a-...
//!   project_id: 3160
//!   organization_id: 3036
//!   push:
//!     sources:
//!       - file: i18n/<language_code>/*.json
//!   pull:
//!     targets:
//!       - file: i18n/<language_code>/<filename>.<extension>
//! ```
//!
//! The first readable file among `$QORDOBA_CONFIG`, `./.qordoba.yml` and
//! `~/.qordoba.yml` is used. Command-line values replace file values.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const SETTINGS_FILE_NAME: &str = ".qordoba.yml";
pub const DEFAULT_API_URL: &str = "https://app.qordoba.com/api/";

/// A settings key that commands may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    ProjectId,
    AccessToken,
    OrganizationId,
}

impl SettingKey {
    pub fn name(self) -> &'static str {
        match self {
            SettingKey::ProjectId => "project_id",
            SettingKey::AccessToken => "access_token",
            SettingKey::OrganizationId => "organization_id",
        }
    }
}

/// Keys every command needs.
pub const REQUIRED_KEYS: &[SettingKey] = &[SettingKey::ProjectId, SettingKey::AccessToken];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternEntry {
    pub file: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushSettings {
    #[serde(default)]
    pub sources: Vec<PatternEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PullSettings {
    #[serde(default)]
    pub targets: Vec<PatternEntry>,
}

/// Values given on the command line; `Some` wins over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub access_token: Option<String>,
    pub project_id: Option<u64>,
    pub organization_id: Option<u64>,
}

/// Contents of the `qordoba` mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// File the settings were read from, and where `save` writes.
    #[serde(skip)]
    path: PathBuf,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<PushSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull: Option<PullSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Keys this client does not use, kept so `save` does not drop them.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yml::Value>,
}

#[derive(Serialize)]
struct SettingsDocument<'a> {
    qordoba: &'a Settings,
}

/// `./.qordoba.yml` under the current directory.
pub fn default_settings_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(SETTINGS_FILE_NAME)
}

/// Settings files to try, in order.
pub fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(3);
    if let Some(path) = std::env::var_os("QORDOBA_CONFIG").filter(|p| !p.is_empty()) {
        paths.push(PathBuf::from(path));
    }
    paths.push(default_settings_path());
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(SETTINGS_FILE_NAME));
    }
    paths
}

impl Settings {
    /// Empty settings that will be saved to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Settings {
            path: path.into(),
            ..Settings::default()
        }
    }

    /// Read one settings file.
    ///
    /// A document without a `qordoba` mapping gives empty settings.
    ///
    /// # Errors
    /// * [`Error::Io`] when the file cannot be read
    /// * [`Error::SettingsInvalid`] when it is not valid YAML or has wrong value types
    pub fn from_file(path: &Path) -> Result<Settings> {
        let text = std::fs::read_to_string(path)?;
        let invalid = |reason: String| Error::SettingsInvalid {
            path: path.to_path_buf(),
            reason,
        };

        let document: serde_yml::Value =
            serde_yml::from_str(&text).map_err(|e| invalid(e.to_string()))?;
        let mut settings = match document.get("qordoba") {
            Some(section) if !section.is_null() => {
                serde_yml::from_value::<Settings>(section.clone()).map_err(|e| invalid(e.to_string()))?
            }
            _ => {
                warn!("Could not parse config file: {}", path.display());
                Settings::default()
            }
        };
        settings.path = path.to_path_buf();
        Ok(settings)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace file values with the command-line ones that were given.
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(token) = &overrides.access_token {
            self.access_token = Some(token.clone());
        }
        if let Some(project_id) = overrides.project_id {
            self.project_id = Some(project_id);
        }
        if let Some(organization_id) = overrides.organization_id {
            self.organization_id = Some(organization_id);
        }
    }

    /// Fail on the first key in `keys` without a value.
    pub fn validate(&self, keys: &[SettingKey]) -> Result<()> {
        for key in keys {
            let present = match key {
                SettingKey::ProjectId => self.project_id.is_some(),
                SettingKey::AccessToken => self.access_token.as_deref().is_some_and(|t| !t.is_empty()),
                SettingKey::OrganizationId => self.organization_id.is_some(),
            };
            if !present {
                return Err(Error::SettingsMissing(key.name().to_string()));
            }
        }
        Ok(())
    }

    pub fn project_id(&self) -> Result<u64> {
        self.project_id
            .ok_or_else(|| Error::SettingsMissing(SettingKey::ProjectId.name().to_string()))
    }

    pub fn access_token(&self) -> Result<&str> {
        self.access_token
            .as_deref()
            .ok_or_else(|| Error::SettingsMissing(SettingKey::AccessToken.name().to_string()))
    }

    pub fn organization_id(&self) -> Result<u64> {
        self.organization_id
            .ok_or_else(|| Error::SettingsMissing(SettingKey::OrganizationId.name().to_string()))
    }

    /// The first push source pattern.
    pub fn push_pattern(&self) -> Result<&str> {
        self.push
            .as_ref()
            .and_then(|push| push.sources.first())
            .map(|entry| entry.file.as_str())
            .ok_or_else(|| Error::SettingsMissing("push.sources[0].file".to_string()))
    }

    /// The first pull target pattern, if any.
    pub fn pull_pattern(&self) -> Option<&str> {
        self.pull
            .as_ref()
            .and_then(|pull| pull.targets.first())
            .map(|entry| entry.file.as_str())
    }

    /// Base URL of the service API.
    ///
    /// `QORDOBA_API_URL` wins over the `api_url` key.
    pub fn api_url(&self) -> String {
        resolve_api_url(std::env::var("QORDOBA_API_URL").ok(), self.api_url.as_deref())
    }

    /// Validate and write `{qordoba: settings}` to the settings path.
    pub fn save(&self) -> Result<()> {
        self.validate(REQUIRED_KEYS)?;

        let yaml = serde_yml::to_string(&SettingsDocument { qordoba: self })?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, yaml)?;

        debug!("Created config file: {}", self.path.display());
        info!("Config `{}` successfully saved.", self.path.display());
        Ok(())
    }
}

fn resolve_api_url(env: Option<String>, configured: Option<&str>) -> String {
    env.filter(|url| !url.is_empty())
        .or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Load settings from the first usable file in `paths`.
///
/// Returns the settings and whether a file was found. Unreadable or
/// unparseable candidates are skipped. When none is usable the settings
/// point at `./.qordoba.yml`.
pub fn load_settings_from(paths: &[PathBuf], overrides: &Overrides) -> (Settings, bool) {
    info!("Loading Qordoba config...");

    for path in paths {
        match Settings::from_file(path) {
            Ok(mut settings) => {
                debug!("Loaded config file: {}", path.display());
                settings.apply(overrides);
                return (settings, true);
            }
            Err(e) => debug!("Skipping config file {}: {}", path.display(), e),
        }
    }

    let mut settings = Settings::new(default_settings_path());
    settings.apply(overrides);
    (settings, false)
}

/// Load settings from the standard locations and check the required keys.
pub fn load_settings(overrides: &Overrides) -> Result<Settings> {
    let (settings, loaded) = load_settings_from(&candidate_paths(), overrides);
    if !loaded {
        info!("Config not found...");
    }
    settings.validate(REQUIRED_KEYS)?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
qordoba:
  access_token: token-123
  project_id: 3160
  organization_id: 3036
  push:
    sources:
      - file: i18n/<language_code>/*.json
  pull:
    targets:
      - file: i18n/<language_code>/<filename>.<extension>
  team: localization
"#;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    // ==================== Parsing Tests ====================

    #[test]
    fn test_from_file_reads_all_keys() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, ".qordoba.yml", SAMPLE);

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.access_token().unwrap(), "token-123");
        assert_eq!(settings.project_id().unwrap(), 3160);
        assert_eq!(settings.organization_id().unwrap(), 3036);
        assert_eq!(settings.push_pattern().unwrap(), "i18n/<language_code>/*.json");
        assert_eq!(settings.pull_pattern(), Some("i18n/<language_code>/<filename>.<extension>"));
        assert_eq!(settings.path(), path.as_path());
        assert!(settings.extra.contains_key("team"));
    }

    #[test]
    fn test_from_file_without_section_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "other.yml", "something: else\n");

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.project_id, None);
        assert!(settings.push_pattern().is_err());
        assert_eq!(settings.pull_pattern(), None);
    }

    #[test]
    fn test_from_file_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "broken.yml", "qordoba: [unclosed\n");

        assert!(matches!(Settings::from_file(&path), Err(Error::SettingsInvalid { .. })));
    }

    #[test]
    fn test_from_file_wrong_value_type() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "typed.yml", "qordoba:\n  project_id: not-a-number\n");

        assert!(matches!(Settings::from_file(&path), Err(Error::SettingsInvalid { .. })));
    }

    // ==================== Loading Tests ====================

    #[test]
    fn test_load_uses_first_usable_file() {
        let dir = TempDir::new().unwrap();
        let broken = write(&dir, "broken.yml", "qordoba: [unclosed\n");
        let good = write(&dir, "good.yml", SAMPLE);
        let missing = dir.path().join("missing.yml");

        let (settings, loaded) = load_settings_from(&[missing, broken, good.clone()], &Overrides::default());
        assert!(loaded);
        assert_eq!(settings.path(), good.as_path());
        assert_eq!(settings.project_id, Some(3160));
    }

    #[test]
    fn test_load_applies_overrides() {
        let dir = TempDir::new().unwrap();
        let good = write(&dir, "good.yml", SAMPLE);
        let overrides = Overrides {
            access_token: Some("cli-token".to_string()),
            project_id: None,
            organization_id: Some(1),
        };

        let (settings, _) = load_settings_from(&[good], &overrides);
        assert_eq!(settings.access_token.as_deref(), Some("cli-token"));
        assert_eq!(settings.project_id, Some(3160));
        assert_eq!(settings.organization_id, Some(1));
    }

    #[test]
    fn test_load_without_files() {
        let overrides = Overrides {
            access_token: Some("t".to_string()),
            project_id: Some(7),
            organization_id: None,
        };

        let (settings, loaded) = load_settings_from(&[], &overrides);
        assert!(!loaded);
        assert!(settings.path().ends_with(SETTINGS_FILE_NAME));
        assert!(settings.validate(REQUIRED_KEYS).is_ok());
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_validate_reports_first_missing_key() {
        let settings = Settings::new("x.yml");
        match settings.validate(REQUIRED_KEYS) {
            Err(Error::SettingsMissing(key)) => assert_eq!(key, "project_id"),
            other => panic!("unexpected: {other:?}"),
        }

        let mut settings = Settings::new("x.yml");
        settings.project_id = Some(1);
        settings.access_token = Some(String::new());
        let err = settings.validate(REQUIRED_KEYS).unwrap_err();
        assert_eq!(
            err.to_string(),
            "access_token param is required. Please provide it by argument or in config file."
        );
    }

    #[test]
    fn test_validate_organization() {
        let mut settings = Settings::new("x.yml");
        settings.project_id = Some(1);
        settings.access_token = Some("t".to_string());
        assert!(settings.validate(REQUIRED_KEYS).is_ok());
        assert!(matches!(
            settings.validate(&[SettingKey::OrganizationId]),
            Err(Error::SettingsMissing(_))
        ));
    }

    // ==================== Save Tests ====================

    #[test]
    fn test_save_round_trip_keeps_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, ".qordoba.yml", SAMPLE);

        let mut settings = Settings::from_file(&path).unwrap();
        settings.apply(&Overrides {
            access_token: None,
            project_id: Some(42),
            organization_id: None,
        });
        settings.save().unwrap();

        let reloaded = Settings::from_file(&path).unwrap();
        assert_eq!(reloaded.project_id, Some(42));
        assert_eq!(reloaded.extra.get("team").and_then(|v| v.as_str()), Some("localization"));
        assert_eq!(reloaded.push_pattern().unwrap(), "i18n/<language_code>/*.json");
    }

    #[test]
    fn test_save_requires_keys() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::new(dir.path().join(".qordoba.yml"));

        assert!(matches!(settings.save(), Err(Error::SettingsMissing(_))));
        assert!(!dir.path().join(".qordoba.yml").exists());
    }

    // ==================== API URL Tests ====================

    #[test]
    fn test_resolve_api_url() {
        assert_eq!(resolve_api_url(None, None), DEFAULT_API_URL);
        assert_eq!(resolve_api_url(None, Some("http://localhost:1/")), "http://localhost:1/");
        assert_eq!(
            resolve_api_url(Some("http://env/".to_string()), Some("http://file/")),
            "http://env/"
        );
        assert_eq!(resolve_api_url(Some(String::new()), None), DEFAULT_API_URL);
    }
}

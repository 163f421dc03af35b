use crate::api::{PageStatus, ProjectApi, SearchFilter};
use crate::commands::save_response;
use crate::config::Settings;
use crate::error::Error;
use crate::i18n::{Language, LanguageRegistry};
use crate::prompt::Prompter;
use crate::sources::{expand_pattern, resolve_relative_path, Direction, DEFAULT_PULL_PATTERN};
use anyhow::Result;
use futures::TryStreamExt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What to do when a pulled file already exists locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateAction {
    Skip,
    Replace,
    SetNew,
}

impl UpdateAction {
    pub const ALL: [UpdateAction; 3] = [UpdateAction::Skip, UpdateAction::Replace, UpdateAction::SetNew];

    pub fn label(self) -> &'static str {
        match self {
            UpdateAction::Skip => "Skip",
            UpdateAction::Replace => "Replace",
            UpdateAction::SetNew => "Set new filename",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PullOptions {
    /// Overwrite existing files without asking.
    pub force: bool,
    /// Language codes to pull; every target language when empty.
    pub languages: Vec<String>,
    /// Download translations that are not completed yet.
    pub in_progress: bool,
    /// Answer for existing files; asks when `None`.
    pub update_action: Option<UpdateAction>,
}

/// Resolve the requested codes and check them against the project targets.
fn select_languages(
    registry: &LanguageRegistry,
    requested: &[String],
    targets: &[Language],
) -> crate::Result<Vec<Language>> {
    let mut selected: Vec<Language> = Vec::with_capacity(requested.len());
    for code in requested {
        let language = registry.normalize(code)?;
        if !selected.contains(&language) {
            selected.push(language);
        }
    }

    let unknown: Vec<String> = selected
        .iter()
        .filter(|language| !targets.contains(language))
        .map(|language| language.code().to_string())
        .collect();
    if !unknown.is_empty() {
        return Err(Error::LanguageNotInProject(unknown.join(",")));
    }

    Ok(selected)
}

fn ask_update_action<P: Prompter>(prompter: &mut P) -> crate::Result<UpdateAction> {
    let labels: Vec<String> = UpdateAction::ALL.iter().map(|a| a.label().to_string()).collect();
    let choice = prompter.ask_select(&labels, "Choice: ")?;
    Ok(UpdateAction::ALL[choice])
}

/// Download translations into the paths given by the pull pattern.
///
/// Returns the files written, in download order.
pub async fn pull_command<P: Prompter>(
    api: &ProjectApi,
    registry: &LanguageRegistry,
    settings: &Settings,
    curdir: &Path,
    options: &PullOptions,
    mut prompter: P,
) -> Result<Vec<PathBuf>> {
    let project = api.get_project().await?;
    let languages = if options.languages.is_empty() {
        project.target_languages.clone()
    } else {
        select_languages(registry, &options.languages, &project.target_languages)?
    };

    let pattern = settings.pull_pattern().unwrap_or(DEFAULT_PULL_PATTERN);

    let status = if options.in_progress {
        PageStatus::Enabled
    } else {
        debug!("Pull only completed translations.");
        PageStatus::Completed
    };

    let mut written = Vec::new();
    for language in &languages {
        let mut pages = api.page_search(language.id(), SearchFilter::with_status(&[status]));
        let mut pages = std::pin::pin!(pages.stream());
        let mut started = false;

        while let Some(page) = pages.try_next().await? {
            started = true;
            let details = api.get_page_details(language.id(), page.page_id).await?;

            info!(
                "Downloading translation file for source `{}` and language `{}`",
                page.display_name(),
                language.code()
            );

            let milestone = match (&details.status, options.in_progress) {
                (Some(status), true) => {
                    debug!("Selected status for page `{}` - {}", details.id, status.name);
                    Some(status.id)
                }
                _ => None,
            };

            let relpath = expand_pattern(pattern, language, &details.name, Direction::Pull)?;
            let mut target = resolve_relative_path(registry, curdir, Path::new(&relpath), language)?;

            if target.full_path().exists() && !options.force {
                warn!("Translation file already exists. `{}`", target.full_path().display());

                let action = match options.update_action {
                    Some(action) => action,
                    None => ask_update_action(&mut prompter)?,
                };
                match action {
                    UpdateAction::Skip => {
                        info!("Download translation file `{}` was skipped.", target.full_path().display());
                        continue;
                    }
                    UpdateAction::SetNew => {
                        while target.full_path().exists() {
                            let name = prompter.ask_text("Set new filename: ")?;
                            target = target.with_file_name(name.trim());
                        }
                    }
                    UpdateAction::Replace => {}
                }
            }

            let response = api.download_file(details.id, language.id(), milestone).await?;
            let dest = target.full_path();
            save_response(response, &dest).await?;

            info!(
                "Downloaded translation file `{}` for source `{}` and language `{}`",
                dest.display(),
                page.display_name(),
                language.code()
            );
            written.push(dest);
        }

        if !started {
            info!("Nothing to download for language `{}`", language.code());
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::LanguageRecord;

    fn record(id: u64, code: &str, name: &str) -> LanguageRecord {
        LanguageRecord {
            id,
            code: code.to_string(),
            name: name.to_string(),
            direction: None,
        }
    }

    fn registry() -> LanguageRegistry {
        LanguageRegistry::with_languages(&[
            record(94, "en-us", "English - United States"),
            record(190, "ru-ru", "Russian - Russia"),
            record(150, "ja-jp", "Japanese - Japan"),
            record(110, "fr-fr", "French - France"),
        ])
    }

    fn codes(languages: &[Language]) -> Vec<&str> {
        languages.iter().map(Language::code).collect()
    }

    #[test]
    fn test_select_languages_normalizes_and_dedups() {
        let registry = registry();
        let targets = vec![registry.normalize("ru-ru").unwrap(), registry.normalize("ja-jp").unwrap()];
        let requested = vec!["RU_ru".to_string(), "ja".to_string(), "ru".to_string()];

        let selected = select_languages(&registry, &requested, &targets).unwrap();
        assert_eq!(codes(&selected), vec!["ru-ru", "ja-jp"]);
    }

    #[test]
    fn test_select_languages_outside_project() {
        let registry = registry();
        let targets = vec![registry.normalize("ru-ru").unwrap()];
        let requested = vec!["fr".to_string(), "ru".to_string()];

        match select_languages(&registry, &requested, &targets) {
            Err(Error::LanguageNotInProject(codes)) => assert_eq!(codes, "fr-fr"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_select_unknown_language() {
        let registry = registry();
        let result = select_languages(&registry, &["xx".to_string()], &[]);
        assert!(matches!(result, Err(Error::LanguageNotFound(_))));
    }

    #[test]
    fn test_update_action_labels() {
        let labels: Vec<&str> = UpdateAction::ALL.iter().map(|a| a.label()).collect();
        assert_eq!(labels, vec!["Skip", "Replace", "Set new filename"]);
    }
}

use crate::api::{AppendFile, Column, ColumnSelection, PageRecord, ProjectApi, SearchFilter};
use crate::config::Settings;
use crate::error::Error;
use crate::i18n::LanguageRegistry;
use crate::prompt::Prompter;
use crate::sources::{content_type_for, discover_files, mimetype, resolve_relative_path, TranslationFile};
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct PushOptions {
    /// Update remote files that already exist instead of uploading new versions.
    pub update: bool,
    /// Version tag for new uploads, or the remote version to update.
    pub version: Option<String>,
    /// Files to push; the settings' push pattern is used when empty.
    pub files: Vec<PathBuf>,
}

/// Ask for a tag that is not empty and not one of `existing`.
fn select_version_tag<P: Prompter>(prompter: &mut P, file_name: &str, existing: &[String]) -> crate::Result<String> {
    info!(
        "File `{}` already exists with tags {}. Please setup new version tag:",
        file_name,
        existing.join(", ")
    );

    loop {
        let answer = prompter.ask_text("VersionTag: ")?;
        let tag = answer.trim();
        if !tag.is_empty() && !existing.iter().any(|t| t == tag) {
            return Ok(tag.to_string());
        }
    }
}

/// Pick source and reference columns of a tabular upload.
///
/// A single column is the source. Otherwise the user picks the sources, then
/// optionally one reference among the rest; the reference is also sent as a
/// source column.
fn select_source_columns<P: Prompter>(prompter: &mut P, columns: &[Column]) -> crate::Result<ColumnSelection> {
    if let [only] = columns {
        return Ok(ColumnSelection {
            source_columns: vec![only.id],
            reference_column: None,
        });
    }

    info!("Please select columns as sources: ");
    let labels: Vec<String> = columns.iter().map(Column::to_string).collect();
    let picked = prompter.ask_select_multiple(&labels, "Set: ")?;
    let mut source_columns: Vec<i64> = picked.iter().map(|&i| columns[i].id).collect();

    let remaining: Vec<&Column> = columns
        .iter()
        .filter(|column| !source_columns.contains(&column.id))
        .collect();

    let mut reference_column = None;
    if !remaining.is_empty() {
        info!("Please select column as reference: ");
        let mut labels: Vec<String> = remaining.iter().map(|c| c.to_string()).collect();
        labels.push("Skip".to_string());

        let choice = prompter.ask_select(&labels, "Select: ")?;
        if let Some(column) = remaining.get(choice) {
            reference_column = Some(column.id);
            source_columns.push(column.id);
        }
    }

    Ok(ColumnSelection {
        source_columns,
        reference_column,
    })
}

async fn read_file(file: &TranslationFile) -> Result<Vec<u8>> {
    let path = file.full_path();
    tokio::fs::read(&path)
        .await
        .with_context(|| format!("Can't open '{}'", path.display()))
}

async fn upload_file<P: Prompter>(
    api: &ProjectApi,
    file: &TranslationFile,
    version: Option<&str>,
    prompter: &mut P,
) -> Result<()> {
    info!("Uploading {}", file.full_path().display());

    let file_name = file.unique_name();
    let content_type = content_type_for(file.extension())?;
    let content = read_file(file).await?;

    let upload = api
        .upload_anytype_file(content, file_name, content_type, mimetype(content_type))
        .await?;
    debug!(
        "File `{}` uploaded. Name - `{}`. Adding to the project...",
        file.full_path().display(),
        file_name
    );

    let mut taken = upload.version_tags.clone();
    let mut version_tag = version.map(str::to_string);
    let conflicts = |tag: &Option<String>, taken: &[String]| match tag {
        Some(tag) => taken.contains(tag),
        None => true,
    };
    if !taken.is_empty() && conflicts(&version_tag, &taken) {
        version_tag = Some(select_version_tag(prompter, file_name, &taken)?);
    }

    let columns = match upload.columns.as_deref() {
        Some(columns) if !columns.is_empty() => select_source_columns(prompter, columns)?,
        _ => ColumnSelection::default(),
    };

    loop {
        let append = AppendFile::new(&upload.upload_id, file_name, columns.clone(), version_tag.clone());
        match api.append_file(&append).await {
            Ok(_) => break,
            Err(e) if e.is_already_exists() => {
                warn!("{}", e);
                taken.extend(version_tag.take());
                version_tag = Some(select_version_tag(prompter, file_name, &taken)?);
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!("Uploaded {} successfully as {}", file.full_path().display(), file_name);
    Ok(())
}

async fn update_file(
    api: &ProjectApi,
    file: &TranslationFile,
    remote_files: &[PageRecord],
    version: Option<&str>,
) -> Result<()> {
    let file_name = file.unique_name();
    info!("Updating {}", file_name);

    let remote = match version {
        Some(version) => remote_files
            .iter()
            .find(|page| page.version_tag.as_deref() == Some(version))
            .ok_or_else(|| Error::VersionNotFound {
                file_name: file_name.to_string(),
                version: version.to_string(),
            })?,
        None => match remote_files.first() {
            Some(page) => page,
            None => bail!("No remote file to update for {}", file_name),
        },
    };

    let mime = content_type_for(file.extension())
        .map(mimetype)
        .unwrap_or("application/octet-stream");
    let content = read_file(file).await?;

    let upload = api.update_upload_file(content, file_name, remote.page_id, mime).await?;
    api.apply_upload_file(&upload.id, remote.page_id).await?;

    info!("Updated {} successfully.", file_name);
    Ok(())
}

fn collect_files(
    registry: &LanguageRegistry,
    settings: &Settings,
    curdir: &Path,
    options: &PushOptions,
    source: &crate::i18n::Language,
) -> Result<Vec<TranslationFile>> {
    if options.files.is_empty() {
        let pattern = settings.push_pattern()?;
        let files: Vec<TranslationFile> = discover_files(registry, curdir, pattern, source)?.collect();
        if files.is_empty() {
            return Err(Error::FilesNotFound(format!("Files not found by pattern `{pattern}`")).into());
        }
        return Ok(files);
    }

    options
        .files
        .iter()
        .map(|path| {
            let file = resolve_relative_path(registry, curdir, path, source)?;
            if !file.full_path().is_file() {
                bail!("Can't open '{}'", path.display());
            }
            Ok(file)
        })
        .collect()
}

/// Upload source files, or update their remote copies with `--update`.
///
/// Stops at the first file that fails.
pub async fn push_command<P: Prompter>(
    api: &ProjectApi,
    registry: &LanguageRegistry,
    settings: &Settings,
    curdir: &Path,
    options: &PushOptions,
    mut prompter: P,
) -> Result<()> {
    let project = api.get_project().await?;
    let source = registry.normalize(&project.source_language)?;
    let target = project.first_target()?;

    let files = collect_files(registry, settings, curdir, options, &source)?;
    let version = options.version.as_deref();

    for file in &files {
        let remote_files = api
            .page_search(target.id(), SearchFilter::with_title(file.unique_name()))
            .collect_all()
            .await?;

        if !remote_files.is_empty() && options.update {
            update_file(api, file, &remote_files, version).await?;
        } else {
            upload_file(api, file, version, &mut prompter).await?;
        }
    }

    Ok(())
}

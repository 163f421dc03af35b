//! Command orchestration.
//!
//! Each submodule drives one CLI subcommand on top of [`ProjectApi`]. Commands
//! return `anyhow::Result`; library errors pass through unchanged and can be
//! recovered with `downcast_ref::<qordoba_cli::Error>()`.

pub mod delete;
pub mod init;
pub mod ls;
pub mod pull;
pub mod push;
pub mod status;

use crate::api::ProjectApi;
use crate::i18n::LanguageRegistry;
use anyhow::{Context, Result};
use futures::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::debug;

pub use delete::delete_command;
pub use init::init_command;
pub use ls::{ls_command, ls_table, LsRow};
pub use pull::{pull_command, PullOptions, UpdateAction};
pub use push::{push_command, PushOptions};
pub use status::status_command;

/// Fill `registry` with the service's language list.
pub async fn init_language_registry(api: &ProjectApi, registry: &LanguageRegistry) -> Result<()> {
    let languages = api
        .get_languages()
        .await
        .context("Failed to fetch the language list")?;
    registry.initialize(&languages);
    Ok(())
}

/// Stream a download body into `dest`, creating parent directories.
///
/// The file is truncated first; an interrupted download leaves it partial.
pub(crate) async fn save_response(response: reqwest::Response, dest: &Path) -> Result<u64> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = tokio::fs::File::create(dest)
        .await
        .with_context(|| format!("Failed to create {}", dest.display()))?;

    let mut written = 0u64;
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.context("Download interrupted")?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    debug!("Wrote {} bytes to {}", written, dest.display());
    Ok(written)
}

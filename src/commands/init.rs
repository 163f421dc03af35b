use crate::api::ProjectApi;
use crate::config::{Settings, REQUIRED_KEYS};
use crate::error::Error;
use anyhow::Result;
use tracing::{debug, info};

/// Write a settings file after checking the project is reachable.
///
/// `loaded` tells whether `settings` came from an existing file; that file
/// is only overwritten with `force`.
pub async fn init_command(settings: Settings, loaded: bool, force: bool) -> Result<Settings> {
    if loaded && !force {
        return Err(Error::SettingsExist(settings.path().to_path_buf()).into());
    }
    settings.validate(REQUIRED_KEYS)?;

    let api = ProjectApi::new(&settings)?;
    info!("Checking organization and project...");
    let project = api.get_project().await?;
    debug!(
        "Project {} ({}) found",
        project.id,
        project.name.as_deref().unwrap_or("unnamed")
    );

    settings.save()?;
    Ok(settings)
}

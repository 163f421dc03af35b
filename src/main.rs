//! `qordoba` command-line entry point.
//!
//! ```bash
//! qordoba init --access-token <TOKEN> --project-id <ID>
//! qordoba status
//! qordoba push i18n/en.json --version v2
//! qordoba pull --languages fr,de --skip
//! qordoba ls
//! qordoba delete server.en.yml --force
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use qordoba_cli::api::ProjectApi;
use qordoba_cli::commands::{
    delete_command, init_command, init_language_registry, ls_command, ls_table, pull_command, push_command,
    status_command, PullOptions, PushOptions, UpdateAction,
};
use qordoba_cli::config::{candidate_paths, load_settings, load_settings_from, Overrides, SettingKey, Settings};
use qordoba_cli::i18n::LanguageRegistry;
use qordoba_cli::prompt::ConsolePrompter;
use std::future::Future;
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::task::JoinHandle;
use tracing::{error, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Sync localization files with a Qordoba project.
#[derive(Parser)]
#[command(name = "qordoba", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// The ID of your Qordoba project.
    #[arg(long)]
    project_id: Option<u64>,

    /// Your Qordoba access token.
    #[arg(long)]
    access_token: Option<String>,

    /// The ID of your Qordoba organization.
    #[arg(long)]
    organization_id: Option<u64>,

    /// Print the full error chain on failure.
    #[arg(long)]
    traceback: bool,

    /// Enable debug logging.
    #[arg(long)]
    debug: bool,
}

impl CommonArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            access_token: self.access_token.clone(),
            project_id: self.project_id,
            organization_id: self.organization_id,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create your .qordoba.yml configuration file.
    Init(InitArgs),

    /// Show localization status in the current project.
    Status {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// List the project's resources.
    Ls {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Download translations.
    Pull(PullArgs),

    /// Upload source files.
    Push(PushArgs),

    /// Delete a resource and all of its translations.
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
struct InitArgs {
    /// Your Qordoba access token.
    #[arg(long)]
    access_token: String,

    /// The ID of your Qordoba project.
    #[arg(long)]
    project_id: u64,

    /// The ID of your Qordoba organization.
    #[arg(long)]
    organization_id: Option<u64>,

    /// Overwrite an existing config file.
    #[arg(long)]
    force: bool,

    #[arg(long)]
    traceback: bool,

    #[arg(long)]
    debug: bool,
}

#[derive(Args, Debug)]
struct PullArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Also download translations that are not completed yet.
    #[arg(long)]
    in_progress: bool,

    /// Comma-separated language codes to pull.
    #[arg(short, long, value_delimiter = ',')]
    languages: Vec<String>,

    /// Overwrite existing files without asking.
    #[arg(short, long)]
    force: bool,

    /// Skip files that already exist.
    #[arg(long, conflicts_with_all = ["replace", "set_new"])]
    skip: bool,

    /// Replace files that already exist.
    #[arg(long, conflicts_with_all = ["skip", "set_new"])]
    replace: bool,

    /// Ask for a new name when a file already exists.
    #[arg(long, conflicts_with_all = ["skip", "replace"])]
    set_new: bool,
}

impl PullArgs {
    fn update_action(&self) -> Option<UpdateAction> {
        if self.skip {
            Some(UpdateAction::Skip)
        } else if self.replace {
            Some(UpdateAction::Replace)
        } else if self.set_new {
            Some(UpdateAction::SetNew)
        } else {
            None
        }
    }
}

#[derive(Args, Debug)]
struct PushArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Files to push; defaults to the push pattern from the config file.
    files: Vec<PathBuf>,

    /// Update resources that already exist in the project.
    #[arg(long)]
    update: bool,

    /// Version tag to upload as, or to update with --update.
    #[arg(long)]
    version: Option<String>,
}

#[derive(Args, Debug)]
struct DeleteArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Page ID or exact resource name.
    file: String,

    /// Do not ask for confirmation.
    #[arg(short, long)]
    force: bool,
}

impl Commands {
    /// `(debug, traceback)` flags of whichever subcommand was given.
    fn flags(&self) -> (bool, bool) {
        match self {
            Commands::Init(args) => (args.debug, args.traceback),
            Commands::Status { common } | Commands::Ls { common } => (common.debug, common.traceback),
            Commands::Pull(args) => (args.common.debug, args.common.traceback),
            Commands::Push(args) => (args.common.debug, args.common.traceback),
            Commands::Delete(args) => (args.common.debug, args.common.traceback),
        }
    }
}

/// Log to stderr.
///
/// `RUST_LOG` wins when set; otherwise `debug` with `--debug`, else `info`.
/// HTTP internals are capped at `warn`.
fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if debug { "debug" } else { "info" };
        EnvFilter::new(format!("{level},hyper=warn,hyper_util=warn,reqwest=warn"))
    });

    let use_ansi = std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(use_ansi),
        )
        .with(filter)
        .init();
}

/// Load settings, check the extra keys this command needs and build the client.
fn connect(common: &CommonArgs, required: &[SettingKey]) -> Result<(Settings, ProjectApi)> {
    let settings = load_settings(&common.overrides())?;
    settings.validate(required)?;
    let api = ProjectApi::new(&settings)?;
    Ok((settings, api))
}

async fn registry_for(api: &ProjectApi) -> Result<LanguageRegistry> {
    let registry = LanguageRegistry::new();
    init_language_registry(api, &registry).await?;
    Ok(registry)
}

async fn run(command: Commands) -> Result<()> {
    let curdir = std::env::current_dir().context("Failed to read the current directory")?;
    let mut stdout = std::io::stdout();

    match command {
        Commands::Init(args) => {
            let overrides = Overrides {
                access_token: Some(args.access_token),
                project_id: Some(args.project_id),
                organization_id: args.organization_id,
            };
            let (settings, loaded) = load_settings_from(&candidate_paths(), &overrides);
            init_command(settings, loaded, args.force).await?;
        }
        Commands::Status { common } => {
            let (_, api) = connect(&common, &[])?;
            let table = status_command(&api).await?;
            write!(stdout, "{table}")?;
        }
        Commands::Ls { common } => {
            let (_, api) = connect(&common, &[])?;
            let rows = ls_command(&api).await?;
            write!(stdout, "{}", ls_table(&rows))?;
        }
        Commands::Pull(args) => {
            let (settings, api) = connect(&args.common, &[])?;
            let registry = registry_for(&api).await?;
            let options = PullOptions {
                force: args.force,
                languages: args
                    .languages
                    .iter()
                    .map(|code| code.trim().to_string())
                    .filter(|code| !code.is_empty())
                    .collect(),
                in_progress: args.in_progress,
                update_action: args.update_action(),
            };
            pull_command(&api, &registry, &settings, &curdir, &options, ConsolePrompter::stdio()).await?;
        }
        Commands::Push(args) => {
            let (settings, api) = connect(&args.common, &[SettingKey::OrganizationId])?;
            let registry = registry_for(&api).await?;
            let options = PushOptions {
                update: args.update,
                version: args.version,
                files: args.files,
            };
            push_command(&api, &registry, &settings, &curdir, &options, ConsolePrompter::stdio()).await?;
        }
        Commands::Delete(args) => {
            let (_, api) = connect(&args.common, &[SettingKey::OrganizationId])?;
            delete_command(&api, &args.file, args.force, ConsolePrompter::stdio()).await?;
        }
    }

    stdout.flush()?;
    Ok(())
}

/// Run `on_interrupt` once `signal` resolves.
///
/// The watcher is a task of its own, so it still fires while the command is
/// blocked reading an answer from the console.
fn spawn_interrupt_watcher<S, F>(signal: S, on_interrupt: F) -> JoinHandle<()>
where
    S: Future<Output = ()> + Send + 'static,
    F: FnOnce() + Send + 'static,
{
    tokio::spawn(async move {
        signal.await;
        warn!("Interrupted");
        on_interrupt();
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let (debug, traceback) = cli.command.flags();
    init_tracing(debug);

    spawn_interrupt_watcher(
        async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        },
        || std::process::exit(1),
    );

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            if traceback {
                eprintln!("{e:?}");
            }
            ExitCode::FAILURE
        }
    }
}

//! CLI definition and execution
//!
//! Every parameter can be given as a flag or through the `PLUGIN_*`
//! environment variable a CI runner exports for plugin settings. The
//! target decides which of the two operations runs.

use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use cs_core::{ConfigManager, Error, Result, Settings};
use cs_crowdin::{CrowdinClient, HttpTransport};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

pub mod download;
pub mod upload;

/// crowdin-sync - Crowdin CI plugin
///
/// Uploads source files to a Crowdin project or builds and downloads its
/// translations.
#[derive(Parser, Debug)]
#[command(name = "crowdin-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Operation to run
    #[arg(long, env = "PLUGIN_TARGET", value_enum)]
    pub target: Target,

    /// Crowdin personal access token
    #[arg(long, env = "PLUGIN_CROWDIN_KEY", hide_env_values = true)]
    pub crowdin_key: Option<String>,

    /// Numeric project id
    #[arg(long, env = "PLUGIN_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Project name, resolved to an id with one extra lookup
    #[arg(long, env = "PLUGIN_PROJECT_NAME")]
    pub project_name: Option<String>,

    #[command(flatten)]
    pub upload: upload::UploadArgs,

    #[command(flatten)]
    pub download: download::DownloadArgs,

    /// Settings file (defaults to <config dir>/crowdin-sync/config.toml)
    #[arg(long, env = "PLUGIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format: human-readable or JSON
    #[arg(long, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, default_value = "false")]
    pub no_color: bool,

    /// Disable the spinner shown while a build is polled
    #[arg(long, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, default_value = "false")]
    pub debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Target {
    /// Add or update source files
    Upload,
    /// Build translations and extract them locally
    Download,
}

/// How the project was named by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectRef {
    Id(String),
    Name(String),
}

impl ProjectRef {
    /// Pick the project from the parameters; an id wins over a name
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        match (non_empty(&cli.project_id), non_empty(&cli.project_name)) {
            (Some(id), _) => Ok(Self::Id(id.to_string())),
            (None, Some(name)) => Ok(Self::Name(name.to_string())),
            (None, None) => Err(Error::Validation(
                "Crowdin project ID or name not set".into(),
            )),
        }
    }
}

/// A connected client and the project id every request targets
pub struct Session {
    pub client: CrowdinClient<HttpTransport>,
    pub project_id: String,
    resolved_by_name: bool,
}

impl Session {
    async fn connect(settings: Settings, api_key: &str, project: ProjectRef) -> Result<Self> {
        let transport = HttpTransport::new(&settings.api, api_key)?;
        let mut client =
            CrowdinClient::new(transport).with_retry_policy(settings.build.retry_policy());
        if let Some(dir) = settings.temp_dir {
            client = client.with_temp_dir(dir);
        }

        let (project_id, resolved_by_name) = match project {
            ProjectRef::Id(id) => (id, false),
            ProjectRef::Name(name) => (client.find_project_id_by_name(&name).await?, true),
        };

        Ok(Self {
            client,
            project_id,
            resolved_by_name,
        })
    }
}

/// Execute the selected target and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        no_progress: cli.no_progress,
        quiet: cli.quiet,
    };
    let formatter = Formatter::new(output_config.clone());

    formatter.line(&format!(
        "{} {} ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_REPOSITORY")
    ));

    match run(&cli, &formatter, &output_config).await {
        Ok(()) => ExitCode::Success,
        Err(err) => {
            formatter.error(&err.to_string());
            ExitCode::from(&err)
        }
    }
}

async fn run(cli: &Cli, formatter: &Formatter, output_config: &OutputConfig) -> Result<()> {
    let api_key = non_empty(&cli.crowdin_key)
        .ok_or_else(|| Error::Validation("empty Crowdin API key".into()))?;
    let project = ProjectRef::from_cli(cli)?;

    // Parameter problems surface before the first request goes out.
    let session = match cli.target {
        Target::Upload => {
            let mapping = upload::mapping_from_args(&cli.upload)?;
            let session = open_session(cli, api_key, project, formatter).await?;
            upload::execute(&session, &mapping, formatter).await?;
            session
        }
        Target::Download => {
            let plan = download::DownloadPlan::from_args(&cli.download)?;
            let session = open_session(cli, api_key, project, formatter).await?;
            download::execute(&session, &plan, formatter, output_config).await?;
            session
        }
    };

    if session.resolved_by_name {
        formatter.tip(&format!(
            "Use the 'project ID' parameter instead of 'project name'. Your Project ID: {}",
            session.project_id
        ));
    }
    Ok(())
}

async fn open_session(
    cli: &Cli,
    api_key: &str,
    project: ProjectRef,
    formatter: &Formatter,
) -> Result<Session> {
    let settings = load_settings(cli.config.as_deref())?;
    let session = Session::connect(settings, api_key, project).await?;
    formatter.line(&format!("Crowdin project ID: {}", session.project_id));
    Ok(session)
}

/// Load the settings file named on the command line, or the default one
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let manager = match path {
        Some(path) if !path.exists() => {
            return Err(Error::Config(format!(
                "settings file not found: {}",
                path.display()
            )));
        }
        Some(path) => ConfigManager::with_path(path),
        None => match ConfigManager::new() {
            Ok(manager) => manager,
            Err(err) => {
                tracing::debug!(error = %err, "no config directory, using default settings");
                return Ok(Settings::default());
            }
        },
    };
    manager.load()
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

//! download target - Build translations and extract them locally

use std::path::PathBuf;

use clap::{ArgAction, Args};
use cs_core::{Error, Result};
use cs_crowdin::BuildRequest;
use serde::Serialize;

use super::Session;
use crate::output::{Formatter, OutputConfig, Spinner};

/// Parameters of the download target
#[derive(Args, Debug, Default)]
pub struct DownloadArgs {
    /// Directory the translation archive is extracted into
    #[arg(long, env = "PLUGIN_DOWNLOAD_TO")]
    pub download_to: Option<String>,

    /// Leave untranslated strings out of the exported files
    #[arg(
        long,
        env = "PLUGIN_DOWNLOAD_SKIP_UNTRANSLATED_STRINGS",
        action = ArgAction::Set,
        value_parser = parse_switch,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true"
    )]
    pub skip_untranslated_strings: bool,

    /// Leave files with untranslated strings out of the archive
    #[arg(
        long,
        env = "PLUGIN_DOWNLOAD_SKIP_UNTRANSLATED_FILES",
        action = ArgAction::Set,
        value_parser = parse_switch,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true"
    )]
    pub skip_untranslated_files: bool,

    /// Export approved translations only
    #[arg(
        long,
        env = "PLUGIN_DOWNLOAD_EXPORT_APPROVED_ONLY",
        action = ArgAction::Set,
        value_parser = parse_switch,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true"
    )]
    pub export_approved_only: bool,

    /// Target language ids to build, comma separated (default: all)
    #[arg(long, env = "PLUGIN_DOWNLOAD_LANGUAGES", value_delimiter = ',')]
    pub languages: Vec<String>,
}

/// Strict switch: `true`, `false`, or empty for false
fn parse_switch(value: &str) -> std::result::Result<bool, String> {
    match value {
        "true" => Ok(true),
        "" | "false" => Ok(false),
        other => Err(format!("expected 'true' or 'false', got '{other}'")),
    }
}

/// Checked download parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPlan {
    pub dest: PathBuf,
    pub request: BuildRequest,
}

impl DownloadPlan {
    pub fn from_args(args: &DownloadArgs) -> Result<Self> {
        let dest = args
            .download_to
            .as_deref()
            .filter(|d| !d.is_empty())
            .ok_or_else(|| Error::Validation("empty 'download to' parameter".into()))?;

        let target_language_ids = args
            .languages
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            dest: PathBuf::from(dest),
            request: BuildRequest {
                target_language_ids,
                skip_untranslated_strings: args.skip_untranslated_strings,
                skip_untranslated_files: args.skip_untranslated_files,
                export_approved_only: args.export_approved_only,
            },
        })
    }
}

#[derive(Debug, Serialize)]
struct DownloadOutput<'a> {
    project_id: &'a str,
    build_id: u64,
    archive_bytes: u64,
    archive_size_human: String,
    files: Vec<ExtractedFile>,
}

#[derive(Debug, Serialize)]
struct ExtractedFile {
    path: String,
    target: String,
}

/// Build, download and extract, then list every extracted file
pub async fn execute(
    session: &Session,
    plan: &DownloadPlan,
    formatter: &Formatter,
    output_config: &OutputConfig,
) -> Result<()> {
    let spinner = Spinner::start(output_config, "Waiting for translation build");
    let report = session
        .client
        .download_translations(&session.project_id, &plan.dest, &plan.request)
        .await;
    spinner.finish_and_clear();
    let report = report?;

    let size = humansize::format_size(report.archive_bytes, humansize::BINARY);
    let files: Vec<ExtractedFile> = report
        .files
        .iter()
        .map(|path| ExtractedFile {
            path: path.clone(),
            target: plan.dest.join(path).display().to_string(),
        })
        .collect();

    if formatter.is_json() {
        formatter.json(&DownloadOutput {
            project_id: &session.project_id,
            build_id: report.build_id,
            archive_bytes: report.archive_bytes,
            archive_size_human: size,
            files,
        });
    } else {
        formatter.line(&format!("Translation build ID: {}", report.build_id));
        formatter.line(&format!("Downloaded archive: {size}"));
        for file in &files {
            formatter.line(&format!("- Extract: {} -> {}", file.path, file.target));
        }
    }
    Ok(())
}

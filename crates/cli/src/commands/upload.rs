//! upload target - Add or update source files
//!
//! Each local file is matched to a Crowdin file by name: new names are
//! added, existing ones get their content replaced.

use clap::Args;
use cs_core::{Result, UploadMapping};
use cs_crowdin::{UploadAction, UploadOutcome};
use serde::Serialize;

use super::Session;
use crate::output::Formatter;

/// Parameters of the upload target
#[derive(Args, Debug, Default)]
pub struct UploadArgs {
    /// JSON object mapping local paths to Crowdin file names
    #[arg(long, env = "PLUGIN_UPLOAD_FILES")]
    pub upload_files: Option<String>,
}

#[derive(Debug, Serialize)]
struct UploadOutput<'a> {
    project_id: &'a str,
    files: &'a [UploadOutcome],
}

/// Parse and check the file mapping without touching the network
pub fn mapping_from_args(args: &UploadArgs) -> Result<UploadMapping> {
    let mapping = UploadMapping::from_json(args.upload_files.as_deref().unwrap_or_default())?;
    mapping.validate()?;
    Ok(mapping)
}

/// Upload every mapped file and report what happened to each
pub async fn execute(
    session: &Session,
    mapping: &UploadMapping,
    formatter: &Formatter,
) -> Result<()> {
    let outcomes = session
        .client
        .upload_files(&session.project_id, mapping)
        .await?;

    if formatter.is_json() {
        formatter.json(&UploadOutput {
            project_id: &session.project_id,
            files: &outcomes,
        });
    } else {
        for outcome in &outcomes {
            formatter.line(&report_line(outcome));
        }
    }
    Ok(())
}

fn report_line(outcome: &UploadOutcome) -> String {
    let label = match outcome.action {
        UploadAction::Added => "Add:   ",
        UploadAction::Updated => "Update:",
    };
    format!(
        "- {label} {} -> {}",
        outcome.local_path, outcome.remote_name
    )
}

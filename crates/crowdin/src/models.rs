//! Crowdin API v2 wire types
//!
//! Only the fields this plugin reads or writes are modelled. Crowdin wraps
//! single resources as `{"data": {...}}` and list items as
//! `{"data": [{"data": {...}}]}`.

use serde::{Deserialize, Serialize};

/// `{"data": T}` envelope
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Paginated list response
#[derive(Debug, Clone, Deserialize)]
pub struct ListPage<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<Envelope<T>>,
}

/// Project list entry
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectEntry {
    pub id: i64,
    pub name: String,
}

/// Project file list entry
#[derive(Debug, Clone, Deserialize)]
pub struct FileEntry {
    pub id: i64,
    pub name: String,
}

/// Options for a translation build
///
/// Sent once when the build is requested; the server owns the job after that.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    /// Restrict the build to these language ids; all target languages if empty
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_language_ids: Vec<String>,
    pub skip_untranslated_strings: bool,
    pub skip_untranslated_files: bool,
    pub export_approved_only: bool,
}

/// Snapshot of a server-side build
#[derive(Debug, Clone, Deserialize)]
pub struct BuildJob {
    pub id: u64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub progress: u32,
}

/// Signed, time-limited archive link
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadDescriptor {
    pub url: String,
}

/// Anonymous storage object created before attaching a file to a project
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageObject {
    pub id: i64,
    #[serde(default)]
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddFileRequest<'a> {
    pub storage_id: i64,
    pub name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateFileRequest {
    pub storage_id: i64,
}

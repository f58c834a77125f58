//! cs-crowdin: Crowdin API v2 adapter for crowdin-sync
//!
//! This crate provides the HTTP transport and the project operations the
//! plugin needs: name lookups, source uploads and translation builds. It is
//! the only crate that talks HTTP.

pub mod build;
pub mod client;
pub mod http;
pub mod models;
pub mod upload;

#[cfg(test)]
mod testing;

pub use build::DownloadReport;
pub use client::{CrowdinClient, PAGE_SIZE};
pub use http::HttpTransport;
pub use models::{BuildJob, BuildRequest, DownloadDescriptor};
pub use upload::{UploadAction, UploadOutcome};

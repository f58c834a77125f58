//! Translation build and download
//!
//! Downloading translations is a server-side job:
//! 1. request a build
//! 2. poll its download endpoint until the service hands out a signed URL
//! 3. fetch the archive into a temporary file
//! 4. extract it into the destination directory
//!
//! The temporary archive is removed before returning, whatever the outcome.

use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

use cs_core::{ApiRequest, Error, Method, Result, RetryFailure, Transport, extract_zip};

use crate::client::CrowdinClient;
use crate::models::{BuildJob, BuildRequest, DownloadDescriptor, Envelope};

const TEMP_ARCHIVE_PREFIX: &str = "crowdin-sync-";

/// Result of a completed download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadReport {
    pub build_id: u64,
    /// Size of the downloaded archive in bytes
    pub archive_bytes: u64,
    /// Archive-relative paths of the files written, in archive order
    pub files: Vec<String>,
}

impl<T: Transport> CrowdinClient<T> {
    /// Build the project's translations and extract them into `dest`
    pub async fn download_translations(
        &self,
        project_id: &str,
        dest: &Path,
        request: &BuildRequest,
    ) -> Result<DownloadReport> {
        let job = self.start_build(project_id, request).await?;
        let descriptor = self.wait_for_build(project_id, job.id).await?;
        self.fetch_and_extract(job.id, &descriptor, dest).await
    }

    /// Ask the service to start a translation build
    pub async fn start_build(&self, project_id: &str, request: &BuildRequest) -> Result<BuildJob> {
        let request = ApiRequest::json(
            Method::Post,
            format!("/api/v2/projects/{project_id}/translations/builds"),
            201,
            request,
        )?;
        let endpoint = request.endpoint();
        let job: Envelope<BuildJob> = self.transport.send(request).await?.decode(&endpoint)?;

        tracing::info!(
            build_id = job.data.id,
            status = %job.data.status,
            progress = job.data.progress,
            "translation build requested"
        );
        Ok(job.data)
    }

    /// Poll until the build can be downloaded
    ///
    /// Errors from the service count as "not ready yet" and are retried per
    /// the client's policy; running out of attempts is a build timeout.
    pub async fn wait_for_build(
        &self,
        project_id: &str,
        build_id: u64,
    ) -> Result<DownloadDescriptor> {
        let path =
            format!("/api/v2/projects/{project_id}/translations/builds/{build_id}/download");

        let outcome = self
            .retry
            .run(self.sleeper.as_ref(), |attempt| {
                let request = ApiRequest::get(path.as_str(), 200);
                async move {
                    tracing::debug!(build_id, attempt = attempt + 1, "checking build");
                    let endpoint = request.endpoint();
                    let descriptor: Envelope<DownloadDescriptor> =
                        self.transport.send(request).await?.decode(&endpoint)?;
                    Ok(descriptor.data)
                }
            })
            .await;

        match outcome {
            Ok(descriptor) => {
                tracing::info!(build_id, "translation build ready");
                Ok(descriptor)
            }
            Err(RetryFailure::Fatal(err)) => Err(err),
            Err(RetryFailure::Exhausted { attempts, last }) => Err(Error::BuildTimeout {
                build_id,
                attempts,
                last: Box::new(last),
            }),
        }
    }

    async fn fetch_and_extract(
        &self,
        build_id: u64,
        descriptor: &DownloadDescriptor,
        dest: &Path,
    ) -> Result<DownloadReport> {
        // Dropping the handle deletes the file, so every early return cleans up.
        let archive = self.temp_archive()?;
        let archive_path = archive.path().to_path_buf();

        let archive_bytes = self.transport.download(&descriptor.url, &archive_path).await?;
        tracing::debug!(build_id, archive_bytes, path = %archive_path.display(), "archive downloaded");

        let target = dest.to_path_buf();
        let extracted = tokio::task::spawn_blocking(move || extract_zip(&archive_path, &target))
            .await
            .unwrap_or_else(|e| Err(Error::General(format!("extraction task failed: {e}"))));

        if let Err(err) = archive.close() {
            tracing::warn!(error = %err, "failed to remove temporary archive");
        }

        let files = extracted?;
        tracing::info!(build_id, files = files.len(), dest = %dest.display(), "translations extracted");

        Ok(DownloadReport {
            build_id,
            archive_bytes,
            files,
        })
    }

    fn temp_archive(&self) -> Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_ARCHIVE_PREFIX).suffix(".zip");

        match &self.temp_dir {
            Some(dir) => builder
                .tempfile_in(dir)
                .map_err(|e| Error::filesystem(dir, e)),
            None => builder
                .tempfile()
                .map_err(|e| Error::filesystem(std::env::temp_dir(), e)),
        }
    }
}

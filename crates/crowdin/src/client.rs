//! Crowdin client
//!
//! Wraps a Transport and exposes the project-level operations used by the
//! plugin. Lookups live here; uploads and builds are in their own modules.

use std::path::PathBuf;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use cs_core::{ApiRequest, Error, Result, RetryPolicy, Sleeper, TokioSleeper, Transport};

use crate::models::{FileEntry, ListPage, ProjectEntry};

/// Page size for every list endpoint
pub const PAGE_SIZE: usize = 500;

/// Client for one Crowdin account
pub struct CrowdinClient<T> {
    pub(crate) transport: T,
    pub(crate) retry: RetryPolicy,
    pub(crate) sleeper: Arc<dyn Sleeper>,
    pub(crate) temp_dir: Option<PathBuf>,
}

impl<T: Transport> CrowdinClient<T> {
    /// Create a client with the default build polling policy
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            retry: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
            temp_dir: None,
        }
    }

    /// Use a different polling policy for builds
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the clock used between build polls
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Place temporary archives in `dir` instead of the system temp directory
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Get the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve a project name to its id
    ///
    /// A project is required for every operation, so a missing name is an error.
    pub async fn find_project_id_by_name(&self, name: &str) -> Result<String> {
        let found = self
            .scan_pages("/api/v2/projects", |project: &ProjectEntry| {
                (project.name == name).then_some(project.id)
            })
            .await?;

        match found {
            Some(id) => Ok(id.to_string()),
            None => Err(Error::NotFound(format!("project name not found: {name}"))),
        }
    }

    /// Find a project file by exact name
    ///
    /// `None` means the file does not exist yet.
    pub async fn find_file_id(&self, project_id: &str, name: &str) -> Result<Option<String>> {
        let collection = format!("/api/v2/projects/{project_id}/files");
        let found = self
            .scan_pages(&collection, |file: &FileEntry| {
                (file.name == name).then_some(file.id)
            })
            .await?;

        Ok(found.map(|id| id.to_string()))
    }

    /// Walk a paginated collection until `pick` matches or an empty page ends it
    async fn scan_pages<E, F>(&self, collection: &str, pick: F) -> Result<Option<i64>>
    where
        E: DeserializeOwned,
        F: Fn(&E) -> Option<i64>,
    {
        let mut offset = 0;
        loop {
            let request = ApiRequest::get(
                format!("{collection}?limit={PAGE_SIZE}&offset={offset}"),
                200,
            );
            let endpoint = request.endpoint();
            let page: ListPage<E> = self.transport.send(request).await?.decode(&endpoint)?;

            if page.data.is_empty() {
                tracing::debug!(%collection, offset, "reached end of collection");
                return Ok(None);
            }

            if let Some(id) = page.data.iter().find_map(|entry| pick(&entry.data)) {
                return Ok(Some(id));
            }

            offset += PAGE_SIZE;
        }
    }
}

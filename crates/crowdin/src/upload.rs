//! Source file upload
//!
//! Crowdin takes file content in two steps: the bytes go to anonymous
//! storage first, then the storage id is attached to a project file.
//! A storage object left behind by a failed second step is never
//! referenced and is not cleaned up.

use std::path::Path;

use serde::Serialize;

use cs_core::{ApiRequest, Method, Result, Transport, UploadMapping};

use crate::client::CrowdinClient;
use crate::models::{AddFileRequest, Envelope, StorageObject, UpdateFileRequest};

/// Header naming the file in anonymous storage
pub const FILE_NAME_HEADER: &str = "Crowdin-API-FileName";

/// What happened to one mapping entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadAction {
    Added,
    Updated,
}

/// Result of uploading one mapping entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    pub local_path: String,
    pub remote_name: String,
    pub action: UploadAction,
    /// Id of the replaced file; absent for new files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
}

impl<T: Transport> CrowdinClient<T> {
    /// Stage a local file in anonymous storage and return the storage id
    pub async fn upload_to_storage(&self, local_path: &Path, remote_name: &str) -> Result<i64> {
        let request = ApiRequest::upload(
            "/api/v2/storages",
            201,
            local_path,
            vec![(FILE_NAME_HEADER.to_string(), remote_name.to_string())],
        );
        let endpoint = request.endpoint();
        let storage: Envelope<StorageObject> =
            self.transport.send(request).await?.decode(&endpoint)?;

        tracing::debug!(storage_id = storage.data.id, %remote_name, "staged file in storage");
        Ok(storage.data.id)
    }

    /// Create a new project file from a local file
    pub async fn add_file(
        &self,
        project_id: &str,
        local_path: &Path,
        remote_name: &str,
    ) -> Result<()> {
        let storage_id = self.upload_to_storage(local_path, remote_name).await?;

        let request = ApiRequest::json(
            Method::Post,
            format!("/api/v2/projects/{project_id}/files"),
            201,
            &AddFileRequest {
                storage_id,
                name: remote_name,
            },
        )?;
        self.transport.send(request).await?;
        Ok(())
    }

    /// Replace the content of an existing project file
    pub async fn update_file(
        &self,
        project_id: &str,
        local_path: &Path,
        remote_name: &str,
        file_id: &str,
    ) -> Result<()> {
        let storage_id = self.upload_to_storage(local_path, remote_name).await?;

        let request = ApiRequest::json(
            Method::Put,
            format!("/api/v2/projects/{project_id}/files/{file_id}"),
            200,
            &UpdateFileRequest { storage_id },
        )?;
        self.transport.send(request).await?;
        Ok(())
    }

    /// Add or update every file in `mapping`
    ///
    /// The mapping is validated as a whole before the first request. A
    /// failure part way through stops the batch; files already sent stay.
    pub async fn upload_files(
        &self,
        project_id: &str,
        mapping: &UploadMapping,
    ) -> Result<Vec<UploadOutcome>> {
        mapping.validate()?;

        let mut outcomes = Vec::with_capacity(mapping.len());
        for (local_path, remote_name) in mapping.iter() {
            let existing = self.find_file_id(project_id, remote_name).await?;

            let action = match &existing {
                None => {
                    self.add_file(project_id, Path::new(local_path), remote_name).await?;
                    UploadAction::Added
                }
                Some(file_id) => {
                    self.update_file(project_id, Path::new(local_path), remote_name, file_id)
                        .await?;
                    UploadAction::Updated
                }
            };

            tracing::info!(%local_path, %remote_name, ?action, "uploaded source file");
            outcomes.push(UploadOutcome {
                local_path: local_path.to_string(),
                remote_name: remote_name.to_string(),
                action,
                file_id: existing,
            });
        }

        Ok(outcomes)
    }
}

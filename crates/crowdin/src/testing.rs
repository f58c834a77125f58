//! Test doubles for the transport and the polling clock

use std::collections::VecDeque;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use cs_core::{ApiRequest, ApiResponse, Error, Result, Sleeper, Transport};

/// Transport that answers from a script and records every call
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<ApiResponse>>>,
    archive: Option<Vec<u8>>,
    requests: Mutex<Vec<ApiRequest>>,
    downloads: Mutex<Vec<(String, PathBuf)>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response
    pub(crate) fn respond(self, status: u16, body: Value) -> Self {
        self.push(Ok(ApiResponse::new(status, body.to_string())))
    }

    /// Queue a raw successful response body
    pub(crate) fn respond_raw(self, status: u16, body: &str) -> Self {
        self.push(Ok(ApiResponse::new(status, body)))
    }

    /// Queue a failure
    pub(crate) fn fail(self, err: Error) -> Self {
        self.push(Err(err))
    }

    /// Queue the answer the service gives while a build is still running
    pub(crate) fn not_ready(self) -> Self {
        self.fail(api_error(404, "build is not finished"))
    }

    /// Bytes served from any signed download URL
    pub(crate) fn with_archive(mut self, bytes: Vec<u8>) -> Self {
        self.archive = Some(bytes);
        self
    }

    fn push(self, response: Result<ApiResponse>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn downloads(&self) -> Vec<(String, PathBuf)> {
        self.downloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let endpoint = request.endpoint();
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted response for {endpoint}"))
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        self.downloads
            .lock()
            .unwrap()
            .push((url.to_string(), dest.to_path_buf()));

        match &self.archive {
            Some(bytes) => {
                std::fs::write(dest, bytes).map_err(|e| Error::filesystem(dest, e))?;
                Ok(bytes.len() as u64)
            }
            None => Err(Error::transport("GET", url, "connection reset")),
        }
    }
}

/// Clock that records waits instead of sleeping
#[derive(Debug, Default)]
pub(crate) struct RecordingSleeper {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub(crate) fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

pub(crate) fn api_error(status: u16, body: &str) -> Error {
    Error::Api {
        method: "GET".into(),
        path: "/scripted".into(),
        status,
        status_line: status.to_string(),
        body: body.into(),
    }
}

/// One page of a Crowdin list response
pub(crate) fn list_page(entries: &[(i64, String)]) -> Value {
    let data: Vec<Value> = entries
        .iter()
        .map(|(id, name)| json!({"data": {"id": id, "name": name}}))
        .collect();
    json!({"data": data, "pagination": {"offset": 0, "limit": 500}})
}

/// In-memory zip; names ending in `/` become directory entries
pub(crate) fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, contents) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options).unwrap();
        } else {
            zip.start_file(*name, options).unwrap();
            zip.write_all(contents).unwrap();
        }
    }
    zip.finish().unwrap().into_inner()
}

//! Transport trait definition
//!
//! Everything that talks to the translation service goes through this trait.
//! It keeps the lookup, upload and build logic independent of the HTTP
//! client and lets tests script the remote side.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// HTTP methods used against the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub const fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    /// Serialized as `application/json`
    Json(serde_json::Value),
    /// Local file streamed as `application/octet-stream` with extra headers
    File {
        path: PathBuf,
        headers: Vec<(String, String)>,
    },
}

/// An authenticated call against the service base address
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path and query relative to the base address
    pub path: String,
    /// The only status code treated as success
    pub expected_status: u16,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>, expected_status: u16) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            expected_status,
            body: RequestBody::Empty,
        }
    }

    pub fn json<B: Serialize>(
        method: Method,
        path: impl Into<String>,
        expected_status: u16,
        body: &B,
    ) -> Result<Self> {
        Ok(Self {
            method,
            path: path.into(),
            expected_status,
            body: RequestBody::Json(serde_json::to_value(body)?),
        })
    }

    /// POST a local file's bytes
    pub fn upload(
        path: impl Into<String>,
        expected_status: u16,
        file: impl Into<PathBuf>,
        headers: Vec<(String, String)>,
    ) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            expected_status,
            body: RequestBody::File {
                path: file.into(),
                headers,
            },
        }
    }

    /// `METHOD path` label used in errors and logs
    pub fn endpoint(&self) -> String {
        let path = self.path.split('?').next().unwrap_or_default();
        format!("{} {}", self.method, path)
    }
}

/// A successful response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Decode the JSON body, naming `endpoint` on failure
    pub fn decode<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|source| Error::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

/// Authenticated API calls plus the credential-free archive fetch
///
/// Implementations must return [`Error::Api`] with the response body when
/// the status differs from `expected_status`, and [`Error::Transport`] when
/// no response was received.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform an authenticated call
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;

    /// Fetch a signed URL without credentials and stream it into `dest`
    ///
    /// Returns the number of bytes written.
    async fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}

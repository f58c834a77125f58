//! reqwest-backed transport
//!
//! Implements the Transport trait from cs-core against the real service.
//! Authenticated calls share one client with a short timeout; the signed
//! archive link is fetched by a second client that carries no credential.

use std::path::Path;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use tokio::io::AsyncWriteExt;
use url::Url;

use cs_core::{ApiRequest, ApiResponse, ApiSettings, Error, Method, RequestBody, Result, Transport};

/// Placeholder recorded when an error response has no readable body
const NO_BODY: &str = "<nil>";

/// HTTP transport for the Crowdin API
pub struct HttpTransport {
    api: Client,
    downloads: Client,
    base_url: Url,
    token: String,
}

impl HttpTransport {
    /// Create a transport for `settings` authenticating with `token`
    pub fn new(settings: &ApiSettings, token: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(&settings.base_url).map_err(|e| {
            Error::Config(format!("invalid API base URL '{}': {e}", settings.base_url))
        })?;

        let api = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.request_timeout())
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        let downloads = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.download_timeout())
            .build()
            .map_err(|e| Error::Config(format!("failed to build download client: {e}")))?;

        Ok(Self {
            api,
            downloads,
            base_url,
            token: token.into(),
        })
    }

    fn url_for(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{path}"))
            .map_err(|e| Error::Config(format!("invalid request path '{path}': {e}")))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let ApiRequest {
            method,
            path,
            expected_status,
            body,
        } = request;

        let url = self.url_for(&path)?;
        tracing::debug!(%method, %path, "sending request");

        let mut builder = self
            .api
            .request(reqwest_method(method), url)
            .bearer_auth(&self.token);

        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::File {
                path: file,
                headers,
            } => {
                let handle = tokio::fs::File::open(&file)
                    .await
                    .map_err(|e| Error::filesystem(&file, e))?;
                let mut builder = builder.header(CONTENT_TYPE, "application/octet-stream");
                for (name, value) in headers {
                    let value = HeaderValue::from_bytes(value.as_bytes()).map_err(|_| {
                        Error::Validation(format!("value for header {name} is not allowed: {value}"))
                    })?;
                    builder = builder.header(name, value);
                }
                builder.body(reqwest::Body::from(handle))
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|e| Error::transport(method.as_str(), &path, e))?;
        let response = expect_status(method.as_str(), &path, expected_status, response).await?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::transport(method.as_str(), &path, e))?;

        Ok(ApiResponse::new(status, bytes.to_vec()))
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        // The signed query string is a credential of its own; keep it out of errors.
        let label = redact_query(url);
        tracing::debug!(url = %label, "downloading archive");

        let response = self
            .downloads
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transport("GET", &label, e.without_url()))?;
        let response = expect_status("GET", &label, 200, response).await?;

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| Error::filesystem(dest, e))?;

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::transport("GET", &label, e.without_url()))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| Error::filesystem(dest, e))?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| Error::filesystem(dest, e))?;

        Ok(written)
    }
}

const fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
    }
}

/// Turn any status other than `expected` into an API error carrying the body
async fn expect_status(
    method: &str,
    path: &str,
    expected: u16,
    response: Response,
) -> Result<Response> {
    let status = response.status();
    if status.as_u16() == expected {
        return Ok(response);
    }

    let body = match response.text().await {
        Ok(text) if !text.is_empty() => text,
        _ => NO_BODY.to_string(),
    };

    Err(Error::Api {
        method: method.to_string(),
        path: path.to_string(),
        status: status.as_u16(),
        status_line: status_line(status),
        body,
    })
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_u16().to_string(),
    }
}

fn redact_query(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.to_string()
        }
        Err(_) => "<invalid download URL>".to_string(),
    }
}

//! Error types for cs-core
//!
//! Provides a unified error type shared by the transport, the Crowdin
//! adapter and the CLI. Every variant maps onto a process exit code.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for cs-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause carried by transport failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for crowdin-sync operations
#[derive(Error, Debug)]
pub enum Error {
    /// Connection, DNS or timeout failure before a status code was received
    #[error("{method} {path}: transport failure: {source}")]
    Transport {
        method: String,
        path: String,
        #[source]
        source: BoxError,
    },

    /// The remote service answered with an unexpected status code
    #[error("{method} {path}: {status_line}: {body}")]
    Api {
        method: String,
        path: String,
        status: u16,
        status_line: String,
        body: String,
    },

    /// Response body did not have the expected JSON shape
    #[error("{endpoint}: failed to decode JSON: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// Caller-supplied input rejected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Named remote resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Build never became downloadable within the polling budget
    #[error("Build {build_id} not ready after {attempts} attempts: {last}")]
    BuildTimeout {
        build_id: u64,
        attempts: u32,
        #[source]
        last: Box<Error>,
    },

    /// Local read/write failure
    #[error("Filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed, unreadable or unsafe archive
    #[error("Archive error in {}: {reason}", path.display())]
    Archive { path: PathBuf, reason: String },

    /// Configuration file or parameter error
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// General error
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Wrap an I/O error with the path it happened on
    pub fn filesystem(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Filesystem {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Build an archive error for `path`
    pub fn archive(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Error::Archive {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Wrap a transport-level failure
    pub fn transport(
        method: impl Into<String>,
        path: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Error::Transport {
            method: method.into(),
            path: path.into(),
            source: source.into(),
        }
    }

    /// Whether a build poll may try again after this error
    ///
    /// The service answers non-200 while a build is still running, so both
    /// transport failures and unexpected statuses are retryable.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::Api { .. })
    }

    /// Get the appropriate exit code for this error
    pub const fn exit_code(&self) -> i32 {
        match self {
            Error::Validation(_) | Error::Config(_) | Error::TomlParse(_) => 2, // UsageError
            Error::Transport { .. } => 3,                                         // NetworkError
            Error::Api { status: 401 | 403, .. } => 4,                            // AuthError
            Error::NotFound(_) => 5,                                              // NotFound
            Error::BuildTimeout { .. } => 6,                                      // BuildTimeout
            _ => 1,                                                               // GeneralError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16) -> Error {
        Error::Api {
            method: "GET".into(),
            path: "/api/v2/projects".into(),
            status,
            status_line: format!("{status} Whatever"),
            body: "{}".into(),
        }
    }

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::Validation("test".into()).exit_code(), 2);
        assert_eq!(Error::Config("test".into()).exit_code(), 2);
        assert_eq!(
            Error::transport("GET", "/x", "connection refused").exit_code(),
            3
        );
        assert_eq!(api(401).exit_code(), 4);
        assert_eq!(api(403).exit_code(), 4);
        assert_eq!(api(500).exit_code(), 1);
        assert_eq!(Error::NotFound("test".into()).exit_code(), 5);
        assert_eq!(
            Error::BuildTimeout {
                build_id: 1,
                attempts: 6,
                last: Box::new(api(404)),
            }
            .exit_code(),
            6
        );
        assert_eq!(Error::General("test".into()).exit_code(), 1);
    }

    #[test]
    fn test_api_error_display_keeps_body() {
        let err = Error::Api {
            method: "POST".into(),
            path: "/api/v2/projects/7/translations/builds".into(),
            status: 404,
            status_line: "404 Not Found".into(),
            body: r#"{"error":{"message":"Project Not Found"}}"#.into(),
        };
        let text = err.to_string();
        assert!(text.starts_with("POST /api/v2/projects/7/translations/builds: 404 Not Found"));
        assert!(text.contains("Project Not Found"));
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(api(404).is_retryable());
        assert!(Error::transport("GET", "/x", "timed out").is_retryable());
        assert!(!Error::NotFound("x".into()).is_retryable());
        assert!(!Error::archive("/tmp/a.zip", "bad").is_retryable());
    }

    #[test]
    fn test_build_timeout_display() {
        let err = Error::BuildTimeout {
            build_id: 42,
            attempts: 6,
            last: Box::new(api(404)),
        };
        let text = err.to_string();
        assert!(text.contains("Build 42 not ready after 6 attempts"));
        assert!(text.contains("404 Whatever"));
    }
}

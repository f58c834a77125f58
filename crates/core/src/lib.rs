//! cs-core: Core library for the crowdin-sync CI plugin
//!
//! This crate provides the pieces that do not depend on a concrete HTTP
//! client:
//! - Error taxonomy shared by every layer
//! - Settings file loading
//! - Upload mapping validation
//! - Build polling retry policy
//! - The Transport trait used to reach the translation service
//! - Zip extraction of downloaded translation bundles

pub mod archive;
pub mod config;
pub mod error;
pub mod mapping;
pub mod retry;
pub mod transport;

pub use archive::extract_zip;
pub use config::{ApiSettings, BuildSettings, ConfigManager, Settings};
pub use error::{BoxError, Error, Result};
pub use mapping::{FORBIDDEN_NAME_CHARS, UploadMapping};
pub use retry::{RetryFailure, RetryPolicy, Sleeper, TokioSleeper};
pub use transport::{ApiRequest, ApiResponse, Method, RequestBody, Transport};

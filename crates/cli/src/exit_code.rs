//! Process exit codes
//!
//! CI pipelines branch on these values, so a code never changes meaning
//! once released.

use cs_core::Error;

/// Outcome classes reported to the CI runner.
///
/// Each failure class gets its own code so a pipeline can tell a bad
/// parameter from a flaky network or a build that never finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,

    /// Anything without a more specific class, e.g. a 5xx from the API
    GeneralError = 1,

    /// Bad parameter: missing key, invalid file mapping, bad settings file
    UsageError = 2,

    /// Timeout, refused or reset connection
    NetworkError = 3,

    /// The API rejected the credential (401/403)
    AuthError = 4,

    /// Project name did not match any project
    NotFound = 5,

    /// Translation build never became downloadable
    BuildTimeout = 6,
}

impl ExitCode {
    const ALL: [Self; 7] = [
        Self::Success,
        Self::GeneralError,
        Self::UsageError,
        Self::NetworkError,
        Self::AuthError,
        Self::NotFound,
        Self::BuildTimeout,
    ];

    /// Numeric value handed to the OS
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Look up the class for a numeric code
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| i32::from(c.code()) == code)
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::GeneralError => "General error",
            Self::UsageError => "Invalid parameters or settings",
            Self::NetworkError => "Network error",
            Self::AuthError => "Authentication or permission failure",
            Self::NotFound => "Project not found",
            Self::BuildTimeout => "Translation build not ready in time",
        }
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        Self::from_code(err.exit_code()).unwrap_or(Self::GeneralError)
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code.code())
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.code())
    }
}

//! Console output
//!
//! `Formatter` writes the per-file report in human or JSON form; `Spinner`
//! covers the silent wait while a translation build runs.

mod formatter;
mod progress;

pub use formatter::Formatter;
pub use progress::Spinner;

/// Output switches taken from the command line
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    pub json: bool,
    pub no_color: bool,
    pub no_progress: bool,
    /// Only errors are printed
    pub quiet: bool,
}

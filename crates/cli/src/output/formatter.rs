//! Console writer for report lines, tips and errors
//!
//! Report lines and the JSON document go to stdout; errors go to stderr.
//! In JSON mode each run prints exactly one document on success, so a
//! pipeline can pipe stdout straight into `jq`.

use serde::Serialize;

use super::OutputConfig;

const RED: &str = "31";
const YELLOW: &str = "33";

#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn is_json(&self) -> bool {
        self.config.json
    }

    /// Print a human-readable report line
    pub fn line(&self, message: &str) {
        if self.silent() {
            return;
        }
        println!("{message}");
    }

    /// Print a highlighted hint for the pipeline author
    pub fn tip(&self, message: &str) {
        if self.silent() {
            return;
        }
        println!("{} {message}", self.label(YELLOW, "TIP:"));
    }

    /// Print the final JSON document
    pub fn json<T: Serialize>(&self, value: &T) {
        if self.config.quiet {
            return;
        }
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("failed to serialize report: {e}"),
        }
    }

    /// Print an error; never suppressed
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.render_error(message));
    }

    fn render_error(&self, message: &str) -> String {
        if self.config.json {
            serde_json::json!({ "error": message }).to_string()
        } else {
            format!("{} {message}", self.label(RED, "error:"))
        }
    }

    fn label(&self, color: &str, text: &str) -> String {
        if self.config.no_color || self.config.json {
            text.to_string()
        } else {
            format!("\x1b[{color}m{text}\x1b[0m")
        }
    }

    // JSON mode keeps stdout for the one document
    fn silent(&self) -> bool {
        self.config.quiet || self.config.json
    }
}

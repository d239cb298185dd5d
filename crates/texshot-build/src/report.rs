//! Failure reporting.
//!
//! Every failure, whether the validator rejected the input or the browser
//! crashed, ends up here. A report is logged, written to the error log
//! file (replacing the previous one), and the output image from any
//! earlier run is deleted so it cannot be mistaken for a fresh result.
//!
//! A report looks like:
//!
//! ```text
//! [TexConvert] ERROR=> {
//!   "message": "TeX error: Incomplete LaTeX command",
//!   "latex": "\\begin{aligned}\n g(x) &= \\sin(x)\n\\end{aligned}"
//! }
//! ```

use log::error;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use texshot_core::Diagnostic;

use crate::FileArtifact;

pub const REPORT_PREFIX: &str = "[TexConvert] ERROR=>";

#[derive(Serialize)]
struct ErrorRecord<'a> {
    message: &'a str,
    latex: &'a str,
}

#[derive(Debug, Clone)]
pub struct ErrorReporter {
    error_log: PathBuf,
    stale_output: FileArtifact,
}

impl ErrorReporter {
    pub fn new(error_log: PathBuf, stale_output: PathBuf) -> Self {
        Self {
            error_log,
            stale_output: FileArtifact::new(stale_output),
        }
    }

    pub fn format_entry(message: &str, latex: &str) -> String {
        let record = ErrorRecord { message, latex };
        match serde_json::to_string_pretty(&record) {
            Ok(body) => format!("{REPORT_PREFIX} {body}"),
            Err(_) => format!("{REPORT_PREFIX} {message}\n{latex}"),
        }
    }

    /// Logs and persists a failure, then removes the stale output image.
    ///
    /// Problems while writing the log or deleting the image are logged and
    /// swallowed so they never replace the failure being reported.
    pub fn report(&self, message: &str, latex: &str) {
        let entry = Self::format_entry(message, latex);
        error!("{}", entry);

        if let Err(e) = fs::write(&self.error_log, &entry) {
            error!("Error while writing error log {:?}: {}", self.error_log, e);
        }

        if let Err(e) = self.stale_output.remove_if_exists() {
            error!(
                "Error while deleting {:?}: {}",
                self.stale_output.path(),
                e
            );
        }
    }

    pub fn report_diagnostic(&self, diagnostic: &Diagnostic) {
        self.report(&diagnostic.message(), &diagnostic.latex);
    }
}

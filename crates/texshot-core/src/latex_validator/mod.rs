//! Structural validation of LaTeX fragments.
//!
//! [`validate`] runs four checks in a fixed order and stops at the first
//! failure:
//!
//! 1. [`check_delimiters`] - `{}`, `[]` and `()` balance
//! 2. [`check_commands`] - control words glued to stray punctuation
//! 3. [`check_environments`] - `\begin{X}` / `\end{X}` balance per name
//! 4. [`check_double_backslashes`] - `\\` line breaks abutting plain text
//!
//! The order decides which single [`Diagnostic`] a malformed input
//! produces: `x}` with a dangling `\end{foo}` reports the brace, never the
//! environment.

use serde::{Serialize, Serializer};
use thiserror::Error;

pub mod backslash_validator;
pub mod command_validator;
pub mod delimiter_validator;
pub mod environment_validator;


pub use backslash_validator::check_double_backslashes;
pub use command_validator::check_commands;
pub use delimiter_validator::{check_delimiters, DelimiterCounters, DelimiterKind};
pub use environment_validator::{check_environments, EnvironmentTable};

/// The class of structural defect found in a fragment.
///
/// The `Display` text is the user-facing message, in the form written to
/// error logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Error)]
pub enum DiagnosticKind {
    #[error("TeX error: Unexpected close brace")]
    UnexpectedCloseBrace,
    #[error("TeX error: Unexpected close bracket")]
    UnexpectedCloseBracket,
    #[error("TeX error: Unexpected close parenthesis")]
    UnexpectedCloseParenthesis,
    #[error("TeX error: Missing close brace")]
    MissingCloseBrace,
    #[error("TeX error: Missing close bracket")]
    MissingCloseBracket,
    #[error("TeX error: Missing close parenthesis")]
    MissingCloseParenthesis,
    #[error("TeX error: Incomplete LaTeX command")]
    IncompleteLatexCommand,
    #[error("TeX error: \\end{{{0}}} without matching \\begin{{{0}}}")]
    EndWithoutBegin(String),
    #[error("TeX error: Missing \\end{{{0}}}")]
    MissingEnd(String),
    #[error("TeX error: Too many \\end{{{0}}} tags")]
    TooManyEnd(String),
    #[error("TeX error: Invalid double backslash usage")]
    InvalidDoubleBackslash,
}

/// A defect found by one of the individual checks, before it is attached
/// to the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defect {
    pub kind: DiagnosticKind,
    /// Byte offset of the offending token, if the defect has a location.
    pub offset: Option<usize>,
}

impl Defect {
    /// A defect with no single location, such as an unclosed delimiter.
    pub fn new(kind: DiagnosticKind) -> Self {
        Self { kind, offset: None }
    }

    pub fn at(kind: DiagnosticKind, offset: usize) -> Self {
        Self {
            kind,
            offset: Some(offset),
        }
    }

    pub fn into_diagnostic(self, latex: &str) -> Diagnostic {
        Diagnostic {
            kind: self.kind,
            offset: self.offset,
            latex: latex.to_string(),
        }
    }
}

/// A validation failure, carrying the rejected fragment for reporting.
///
/// Serializes as `kind`, `message`, `offset` (when known) and `latex`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Byte offset of the defect in `latex`, when it has one.
    pub offset: Option<usize>,
    /// The fragment exactly as it was passed to [`validate`].
    pub latex: String,
}

impl Diagnostic {
    /// The human-readable message, e.g. `TeX error: Missing close brace`.
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

#[derive(Serialize)]
struct DiagnosticRecord<'a> {
    kind: &'a DiagnosticKind,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<usize>,
    latex: &'a str,
}

impl Serialize for Diagnostic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DiagnosticRecord {
            kind: &self.kind,
            message: self.message(),
            offset: self.offset,
            latex: &self.latex,
        }
        .serialize(serializer)
    }
}

/// Validates a LaTeX fragment, returning the first structural defect.
///
/// The input is never modified. The function is pure and may be called
/// concurrently from any number of threads.
///
/// # Errors
///
/// Returns a [`Diagnostic`] for the first failing check, in the order
/// delimiters, commands, environments, double backslashes.
///
/// # Examples
///
/// ```
/// use texshot_core::latex_validator::{validate, DiagnosticKind};
///
/// assert!(validate(r"\frac{a}{b}").is_ok());
/// assert_eq!(
///     validate("x}").unwrap_err().kind,
///     DiagnosticKind::UnexpectedCloseBrace
/// );
/// ```
pub fn validate(tex: &str) -> Result<(), Diagnostic> {
    check_delimiters(tex)
        .and_then(|()| check_commands(tex))
        .and_then(|()| check_environments(tex))
        .and_then(|()| check_double_backslashes(tex))
        .map_err(|defect| defect.into_diagnostic(tex))
}

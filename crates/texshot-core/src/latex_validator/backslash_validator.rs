use once_cell::sync::Lazy;
use regex::Regex;

use super::{Defect, DiagnosticKind};

/// `\\` followed by anything except `\`, `[`, `]`, `{`, `}`, `$`, space, tab
/// or newline.
static GLUED_LINE_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\\\[^\\\[\]{}$ \t\n]").expect("line break pattern compiles")
});

/// Flags `\\` line breaks that run straight into ordinary text, e.g.
/// `a\\b`. Like [`check_commands`](super::check_commands) this is a
/// pattern heuristic: `\\*` and `\\%` are rejected too.
pub fn check_double_backslashes(tex: &str) -> Result<(), Defect> {
    match GLUED_LINE_BREAK.find(tex) {
        Some(found) => Err(Defect::at(DiagnosticKind::InvalidDoubleBackslash, found.start())),
        None => Ok(()),
    }
}

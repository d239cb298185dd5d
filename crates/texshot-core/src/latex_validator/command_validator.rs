use once_cell::sync::Lazy;
use regex::Regex;

use super::{Defect, DiagnosticKind};

/// A control word (`\` plus ASCII letters) directly followed by something
/// other than a letter, a brace, whitespace or another backslash.
static GLUED_COMMAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\[a-zA-Z]+[^a-zA-Z{}\s\\]").expect("glued command pattern compiles")
});

/// Flags control words glued to stray punctuation or digits.
///
/// This is a pattern heuristic, not a grammar check. It rejects inputs
/// that are valid LaTeX, notably `\sin(x)`, `\left(` and `\alpha_1`, and
/// it accepts a control word at the very end of the input. The accepted
/// and rejected characters are pinned by the tests below.
pub fn check_commands(tex: &str) -> Result<(), Defect> {
    match GLUED_COMMAND.find(tex) {
        Some(found) => Err(Defect::at(DiagnosticKind::IncompleteLatexCommand, found.start())),
        None => Ok(()),
    }
}

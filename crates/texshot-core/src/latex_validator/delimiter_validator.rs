use super::{Defect, DiagnosticKind};

/// The three delimiter families tracked independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterKind {
    Brace,       // {}
    Bracket,     // []
    Parenthesis, // ()
}

impl DelimiterKind {
    /// End-of-scan reporting order.
    const PRIORITY: [DelimiterKind; 3] = [
        DelimiterKind::Brace,
        DelimiterKind::Bracket,
        DelimiterKind::Parenthesis,
    ];

    fn unexpected_close(self) -> DiagnosticKind {
        match self {
            DelimiterKind::Brace => DiagnosticKind::UnexpectedCloseBrace,
            DelimiterKind::Bracket => DiagnosticKind::UnexpectedCloseBracket,
            DelimiterKind::Parenthesis => DiagnosticKind::UnexpectedCloseParenthesis,
        }
    }

    fn missing_close(self) -> DiagnosticKind {
        match self {
            DelimiterKind::Brace => DiagnosticKind::MissingCloseBrace,
            DelimiterKind::Bracket => DiagnosticKind::MissingCloseBracket,
            DelimiterKind::Parenthesis => DiagnosticKind::MissingCloseParenthesis,
        }
    }
}

enum Token {
    Open(DelimiterKind),
    Close(DelimiterKind),
}

fn classify(ch: char) -> Option<Token> {
    match ch {
        '{' => Some(Token::Open(DelimiterKind::Brace)),
        '}' => Some(Token::Close(DelimiterKind::Brace)),
        '[' => Some(Token::Open(DelimiterKind::Bracket)),
        ']' => Some(Token::Close(DelimiterKind::Bracket)),
        '(' => Some(Token::Open(DelimiterKind::Parenthesis)),
        ')' => Some(Token::Close(DelimiterKind::Parenthesis)),
        _ => None,
    }
}

/// Open-minus-close counts for each delimiter family.
///
/// Counts are unsigned: a close with nothing open is rejected by
/// [`close`](Self::close) instead of being recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DelimiterCounters {
    pub brace: usize,
    pub bracket: usize,
    pub paren: usize,
}

impl DelimiterCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, kind: DelimiterKind) -> usize {
        match kind {
            DelimiterKind::Brace => self.brace,
            DelimiterKind::Bracket => self.bracket,
            DelimiterKind::Parenthesis => self.paren,
        }
    }

    fn slot(&mut self, kind: DelimiterKind) -> &mut usize {
        match kind {
            DelimiterKind::Brace => &mut self.brace,
            DelimiterKind::Bracket => &mut self.bracket,
            DelimiterKind::Parenthesis => &mut self.paren,
        }
    }

    pub fn open(&mut self, kind: DelimiterKind) {
        *self.slot(kind) += 1;
    }

    /// Records a close. Returns `false`, leaving the count at zero, when
    /// there was nothing open to close.
    pub fn close(&mut self, kind: DelimiterKind) -> bool {
        let slot = self.slot(kind);
        match slot.checked_sub(1) {
            Some(remaining) => {
                *slot = remaining;
                true
            }
            None => false,
        }
    }

    /// The highest-priority family (brace, bracket, parenthesis) that is
    /// still open.
    pub fn first_unclosed(&self) -> Option<DelimiterKind> {
        DelimiterKind::PRIORITY
            .into_iter()
            .find(|kind| self.count(*kind) > 0)
    }

    pub fn is_balanced(&self) -> bool {
        self.first_unclosed().is_none()
    }
}

/// Checks `{}`, `[]` and `()` balance in a single left-to-right pass.
///
/// The first close that has no matching open fails immediately, whichever
/// family it belongs to. Otherwise an unclosed brace is reported before an
/// unclosed bracket, and a bracket before a parenthesis.
///
/// Families are counted independently, so `([)]` passes.
pub fn check_delimiters(tex: &str) -> Result<(), Defect> {
    let mut counters = DelimiterCounters::new();

    for (offset, ch) in tex.char_indices() {
        match classify(ch) {
            Some(Token::Open(kind)) => counters.open(kind),
            Some(Token::Close(kind)) => {
                if !counters.close(kind) {
                    return Err(Defect::at(kind.unexpected_close(), offset));
                }
            }
            None => {}
        }
    }

    match counters.first_unclosed() {
        Some(kind) => Err(Defect::new(kind.missing_close())),
        None => Ok(()),
    }
}

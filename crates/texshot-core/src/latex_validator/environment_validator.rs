use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{Defect, DiagnosticKind};

static BEGIN_ENV: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\begin\{([^}]+)\}").expect("begin pattern compiles"));
static END_ENV: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\end\{([^}]+)\}").expect("end pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Balance {
    count: i64,
    first_begin: usize,
}

/// Per-environment `\begin` minus `\end` counts.
///
/// Iteration follows the order in which names were first seen in a
/// `\begin`, which makes the reported imbalance deterministic when
/// several environments are broken at once.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentTable<'a> {
    balances: IndexMap<&'a str, Balance>,
}

impl<'a> EnvironmentTable<'a> {
    /// Counts every `\begin{X}` in `tex`.
    pub fn from_begins(tex: &'a str) -> Self {
        let mut table = Self::default();
        for caps in BEGIN_ENV.captures_iter(tex) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            table
                .balances
                .entry(name.as_str())
                .or_insert(Balance {
                    count: 0,
                    first_begin: whole.start(),
                })
                .count += 1;
        }
        table
    }

    /// Records an `\end{name}` found at `offset`.
    ///
    /// Fails if no `\begin{name}` exists anywhere in the input.
    pub fn close(&mut self, name: &str, offset: usize) -> Result<(), Defect> {
        match self.balances.get_mut(name) {
            Some(balance) => {
                balance.count -= 1;
                Ok(())
            }
            None => Err(Defect::at(
                DiagnosticKind::EndWithoutBegin(name.to_string()),
                offset,
            )),
        }
    }

    pub fn balance(&self, name: &str) -> Option<i64> {
        self.balances.get(name).map(|b| b.count)
    }

    /// Environment names in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.balances.keys().copied()
    }

    /// The earliest-declared environment whose balance is not zero.
    pub fn first_imbalance(&self) -> Option<Defect> {
        self.balances.iter().find_map(|(name, balance)| {
            let kind = match balance.count {
                0 => return None,
                n if n > 0 => DiagnosticKind::MissingEnd(name.to_string()),
                _ => DiagnosticKind::TooManyEnd(name.to_string()),
            };
            Some(Defect::at(kind, balance.first_begin))
        })
    }
}

/// Checks that every environment is closed exactly as often as it is
/// opened.
///
/// Counting is by name only; nesting order is not verified, so
/// `\begin{a}\begin{b}\end{a}\end{b}` passes.
pub fn check_environments(tex: &str) -> Result<(), Defect> {
    let mut table = EnvironmentTable::from_begins(tex);

    for caps in END_ENV.captures_iter(tex) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        table.close(name.as_str(), whole.start())?;
    }

    match table.first_imbalance() {
        Some(defect) => Err(defect),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_counts_occurrences_in_first_seen_order() {
        let table = EnvironmentTable::from_begins(
            r"\begin{b}\begin{a}\begin{b}\begin{cases}",
        );
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["b", "a", "cases"]);
        assert_eq!(table.balance("b"), Some(2));
        assert_eq!(table.balance("a"), Some(1));
        assert_eq!(table.balance("missing"), None);
    }

    #[test]
    fn test_end_without_begin_points_at_end() {
        let defect = check_environments(r"x \end{foo}").unwrap_err();
        assert_eq!(defect.kind, DiagnosticKind::EndWithoutBegin("foo".into()));
        assert_eq!(defect.offset, Some(2));
    }

    #[test]
    fn test_end_before_begin_is_accepted() {
        // Both scans are independent, so position does not matter.
        assert_eq!(check_environments(r"\end{a}\begin{a}"), Ok(()));
    }

    #[test]
    fn test_too_many_ends() {
        let defect = check_environments(r"\begin{a}\end{a}\end{a}").unwrap_err();
        assert_eq!(defect.kind, DiagnosticKind::TooManyEnd("a".into()));
        assert_eq!(defect.offset, Some(0));
    }

    #[test]
    fn test_first_declared_imbalance_wins() {
        let tex = r"\begin{b}\begin{a}\end{a}\end{a}";
        let defect = check_environments(tex).unwrap_err();
        assert_eq!(defect.kind, DiagnosticKind::MissingEnd("b".into()));
    }

    #[test]
    fn test_crossed_nesting_passes() {
        assert_eq!(
            check_environments(r"\begin{a}\begin{b}\end{a}\end{b}"),
            Ok(())
        );
    }

    #[test]
    fn test_starred_and_spaced_names_are_distinct() {
        let defect = check_environments(r"\begin{align*}x\end{align}").unwrap_err();
        assert_eq!(defect.kind, DiagnosticKind::EndWithoutBegin("align".into()));
    }

    #[test]
    fn test_empty_name_is_not_an_environment() {
        assert_eq!(check_environments(r"\begin{}\end{}"), Ok(()));
    }
}

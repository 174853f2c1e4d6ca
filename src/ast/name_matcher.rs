use serde::{Deserialize, Serialize};

/// How identifiers are compared when matching columns, tables and windows.
///
/// - `CaseSensitive`: names must match exactly.
/// - `CaseInsensitive`: names match ignoring ASCII case.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum NameMatcher {
    #[default]
    CaseSensitive,
    CaseInsensitive,
}

impl NameMatcher {
    pub fn matches(&self, a: &str, b: &str) -> bool {
        match self {
            NameMatcher::CaseSensitive => a == b,
            NameMatcher::CaseInsensitive => a.eq_ignore_ascii_case(b),
        }
    }

    pub fn matches_all(&self, a: &[String], b: &[String]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| self.matches(x, y))
    }
}

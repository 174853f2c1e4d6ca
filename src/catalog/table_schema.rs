use indexmap::IndexSet;

use crate::ast::NameMatcher;

/// Column names of a table, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub columns: IndexSet<String>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Canonical spelling of `column` in this table, if it exists under `matcher`.
    pub fn get(&self, column: &str, matcher: NameMatcher) -> Option<&str> {
        if let Some(exact) = self.columns.get(column) {
            return Some(exact.as_str());
        }
        match matcher {
            NameMatcher::CaseSensitive => None,
            NameMatcher::CaseInsensitive => self.columns.iter()
                .find(|c| matcher.matches(c, column))
                .map(String::as_str),
        }
    }
}

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::ast::{NameMatcher, Span};

static PLAIN_IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").expect("identifier pattern compiles")
});

/// Writes `name` as SQL would need it written: bare when it is a plain
/// identifier, double-quoted otherwise.
pub fn write_identifier(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if PLAIN_IDENTIFIER.is_match(name) {
        write!(f, "{}", name)
    } else {
        write!(f, "\"{}\"", name.replace('"', "\"\""))
    }
}

/// A possibly qualified column reference, e.g. `deptno`, `e.deptno`, `*`, `e.*`.
///
/// A star reference keeps its qualifier (if any) in `names` and sets `star`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub names: Vec<String>,
    pub star: bool,
    pub span: Span,
}

impl ColumnRef {
    pub fn new(names: Vec<String>) -> Self {
        Self { names, star: false, span: Span::default() }
    }

    pub fn simple(name: impl Into<String>) -> Self {
        Self::new(vec![name.into()])
    }

    pub fn qualified(collection: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(vec![collection.into(), name.into()])
    }

    pub fn star() -> Self {
        Self { names: Vec::new(), star: true, span: Span::default() }
    }

    pub fn qualified_star(collection: impl Into<String>) -> Self {
        Self { names: vec![collection.into()], star: true, span: Span::default() }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn is_star(&self) -> bool {
        self.star
    }

    pub fn is_simple(&self) -> bool {
        !self.star && self.names.len() == 1
    }

    /// The single name of an unqualified, non-star reference.
    pub fn simple_name(&self) -> Option<&str> {
        if self.is_simple() { self.names.first().map(String::as_str) } else { None }
    }

    pub fn equals_deep(&self, other: &ColumnRef, matcher: NameMatcher) -> bool {
        self.star == other.star && matcher.matches_all(&self.names, &other.names)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.names.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write_identifier(f, name)?;
        }
        if self.star {
            if self.names.is_empty() { write!(f, "*") } else { write!(f, ".*") }
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Column({})", self)
    }
}

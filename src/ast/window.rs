use std::fmt;

use crate::ast::{write_identifier, NameMatcher, Span, SqlExpr};

/// A window specification, either declared in a WINDOW clause (`name` set)
/// or written inline after OVER.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct WindowSpec {
    /// Name declared by `WINDOW name AS (...)`.
    pub name: Option<String>,
    /// Window this one extends, as in `(w ORDER BY x)`.
    pub reference: Option<String>,
    pub partition_by: Vec<SqlExpr>,
    pub order_by: Vec<SqlExpr>,
    pub span: Span,
}

impl WindowSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Self::default() }
    }

    pub fn extending(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn partition_by(mut self, items: Vec<SqlExpr>) -> Self {
        self.partition_by = items;
        self
    }

    pub fn order_by(mut self, items: Vec<SqlExpr>) -> Self {
        self.order_by = items;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Partition items followed by order items.
    pub fn expression_operands(&self) -> Vec<&SqlExpr> {
        self.partition_by.iter().chain(&self.order_by).collect()
    }

    pub fn equals_deep(&self, other: &WindowSpec, matcher: NameMatcher) -> bool {
        let same_name = |a: &Option<String>, b: &Option<String>| match (a, b) {
            (Some(a), Some(b)) => matcher.matches(a, b),
            (None, None) => true,
            _ => false,
        };
        same_name(&self.name, &other.name)
            && same_name(&self.reference, &other.reference)
            && SqlExpr::all_equal_deep(&self.partition_by, &other.partition_by, matcher)
            && SqlExpr::all_equal_deep(&self.order_by, &other.order_by, matcher)
    }
}

impl fmt::Display for WindowSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if let Some(reference) = &self.reference {
            parts.push(reference.clone());
        }
        if !self.partition_by.is_empty() {
            parts.push(format!("PARTITION BY {}", SqlExpr::join(&self.partition_by)));
        }
        if !self.order_by.is_empty() {
            parts.push(format!("ORDER BY {}", SqlExpr::join(&self.order_by)));
        }
        write!(f, "({})", parts.join(" "))
    }
}

impl fmt::Debug for WindowSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Window(")?;
        if let Some(name) = &self.name {
            write_identifier(f, name)?;
            write!(f, " AS ")?;
        }
        write!(f, "{})", self)
    }
}

use std::fmt::Display;

use crate::ast::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidatorError {
    /// Expression is neither a grouping expression nor inside an aggregate.
    NotGroupExpression { expr: String, span: Span },
    /// Same, under SELECT DISTINCT; also an aggregate in ORDER BY that is not a select item.
    NotSelectDistinctExpression { expr: String, span: Span },
    AggregateIllegalInGroupBy { expr: String, span: Span },
    OrderByOrdinalOutOfRange { position: i64, len: usize },
    UnknownCollection(String),
    UnknownColumn { name: String, candidates: Vec<String> },
    AmbiguousColumn { name: String, matches: Vec<(String, String)> }, // (coll, col)
    UnknownWindow(String),
    /// Scope stack popped out of order: a bug in the caller, not in the query.
    ScopeMismatch { depth: usize },
    InvalidConfig(String),
    InvalidCatalog(String),
}

impl ValidatorError {
    /// True for the errors that describe a grouping violation in the query.
    pub fn is_violation(&self) -> bool {
        matches!(self, ValidatorError::NotGroupExpression { .. } | ValidatorError::NotSelectDistinctExpression { .. })
    }

    /// Offending expression, as the user wrote it.
    pub fn expression(&self) -> Option<&str> {
        match self {
            ValidatorError::NotGroupExpression { expr, .. }
            | ValidatorError::NotSelectDistinctExpression { expr, .. }
            | ValidatorError::AggregateIllegalInGroupBy { expr, .. } => Some(expr),
            _ => None,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            ValidatorError::NotGroupExpression { span, .. }
            | ValidatorError::NotSelectDistinctExpression { span, .. }
            | ValidatorError::AggregateIllegalInGroupBy { span, .. } => Some(*span),
            _ => None,
        }
    }
}

impl Display for ValidatorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidatorError::NotGroupExpression { expr, span } =>
                write!(f, "Expression '{}' is not being grouped\n  at [{}:{}]", expr, span.start, span.end),
            ValidatorError::NotSelectDistinctExpression { expr, span } =>
                write!(f, "Expression '{}' is not in the select clause\n  at [{}:{}]", expr, span.start, span.end),
            ValidatorError::AggregateIllegalInGroupBy { expr, span } =>
                write!(f, "Aggregate expression '{}' is illegal in GROUP BY clause\n  at [{}:{}]", expr, span.start, span.end),
            ValidatorError::OrderByOrdinalOutOfRange { position, len } =>
                write!(f, "ORDER BY position {} out of range [1..{}]", position, len),
            ValidatorError::UnknownCollection(name) => write!(f, "Table '{}' not found", name),
            ValidatorError::UnknownColumn { name, candidates } if candidates.is_empty() =>
                write!(f, "Column '{}' not found in any table", name),
            ValidatorError::UnknownColumn { name, candidates } =>
                write!(f, "Column '{}' not found; candidates: {}", name, candidates.join(", ")),
            ValidatorError::AmbiguousColumn { name, matches } => {
                let tables = matches.iter().map(|(coll, _)| coll.as_str()).collect::<Vec<_>>().join(", ");
                write!(f, "Column '{}' is ambiguous; found in {}", name, tables)
            }
            ValidatorError::UnknownWindow(name) => write!(f, "Window '{}' not found", name),
            ValidatorError::ScopeMismatch { depth } =>
                write!(f, "Scope stack out of balance at depth {}", depth),
            ValidatorError::InvalidConfig(message) => write!(f, "Invalid validator config: {}", message),
            ValidatorError::InvalidCatalog(message) => write!(f, "Invalid catalog: {}", message),
        }
    }
}

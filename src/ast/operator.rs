use serde::{Deserialize, Serialize};

/// What an operator means to grouping analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum OperatorKind {
    /// Aggregate function (SUM, COUNT, ...).
    Aggregate,
    /// `agg(...) FILTER (WHERE cond)`; operand 0 is the aggregate, operand 1 the condition.
    Filter,
    /// `f(...) OVER w`; operand 0 is the windowed call, operand 1 the window.
    Over,
    /// `expr AS alias`; operand 1 is the alias name.
    As,
    /// Any other operator or function.
    Scalar,
}

/// How a call is written, used when rendering it back to SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum OperatorSyntax {
    /// `name(a, b)`
    Function,
    /// `name` (parenthesis-free function, e.g. `CURRENT_DATE`)
    FunctionId,
    /// `a name b`
    Binary,
    /// `name a`
    Prefix,
    /// `a name`
    Postfix,
    /// FILTER, OVER and AS, which have their own shape.
    Special,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operator {
    pub name: String,
    pub kind: OperatorKind,
    pub syntax: OperatorSyntax,
}

impl Operator {
    pub fn new(name: impl Into<String>, kind: OperatorKind, syntax: OperatorSyntax) -> Self {
        Self { name: name.into(), kind, syntax }
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self::new(name, OperatorKind::Scalar, OperatorSyntax::Function)
    }

    pub fn aggregate(name: impl Into<String>) -> Self {
        Self::new(name, OperatorKind::Aggregate, OperatorSyntax::Function)
    }

    pub fn niladic(name: impl Into<String>) -> Self {
        Self::new(name, OperatorKind::Scalar, OperatorSyntax::FunctionId)
    }

    pub fn binary(name: impl Into<String>) -> Self {
        Self::new(name, OperatorKind::Scalar, OperatorSyntax::Binary)
    }

    pub fn prefix(name: impl Into<String>) -> Self {
        Self::new(name, OperatorKind::Scalar, OperatorSyntax::Prefix)
    }

    pub fn postfix(name: impl Into<String>) -> Self {
        Self::new(name, OperatorKind::Scalar, OperatorSyntax::Postfix)
    }

    pub fn filter() -> Self {
        Self::new("FILTER", OperatorKind::Filter, OperatorSyntax::Special)
    }

    pub fn over() -> Self {
        Self::new("OVER", OperatorKind::Over, OperatorSyntax::Special)
    }

    pub fn alias() -> Self {
        Self::new("AS", OperatorKind::As, OperatorSyntax::Special)
    }

    pub fn is_aggregator(&self) -> bool {
        self.kind == OperatorKind::Aggregate
    }

    /// Operator identity: names are SQL keywords/function names, compared
    /// without regard to case.
    pub fn same_as(&self, other: &Operator) -> bool {
        self.kind == other.kind && self.name.eq_ignore_ascii_case(&other.name)
    }
}

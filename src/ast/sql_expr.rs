use std::fmt;

use crate::ast::{Call, ColumnRef, Literal, NameMatcher, Operator, OperatorKind, Select, Span, WindowSpec};

/// A scalar expression node as produced by the parser.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum SqlExpr {
    Literal(Literal),
    /// Keyword flag operand (`BOTH` in `TRIM(BOTH ' ' FROM x)`); not an expression.
    Symbol(String),
    Column(ColumnRef),
    Call(Call),
    /// Inline window specification, the right-hand side of `OVER (...)`.
    Window(Box<WindowSpec>),
    /// Scalar, EXISTS or IN subquery.
    Query(Box<Select>),
}

impl SqlExpr {
    pub fn column(name: impl Into<String>) -> Self {
        SqlExpr::Column(ColumnRef::simple(name))
    }

    pub fn qualified(collection: impl Into<String>, name: impl Into<String>) -> Self {
        SqlExpr::Column(ColumnRef::qualified(collection, name))
    }

    pub fn star() -> Self {
        SqlExpr::Column(ColumnRef::star())
    }

    pub fn int(value: i64) -> Self {
        SqlExpr::Literal(Literal::Int(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        SqlExpr::Literal(Literal::String(value.into()))
    }

    pub fn call(operator: Operator, operands: Vec<SqlExpr>) -> Self {
        SqlExpr::Call(Call::new(operator, operands))
    }

    pub fn binary(name: &str, left: SqlExpr, right: SqlExpr) -> Self {
        Self::call(Operator::binary(name), vec![left, right])
    }

    pub fn alias(expr: SqlExpr, alias: impl Into<String>) -> Self {
        Self::call(Operator::alias(), vec![expr, SqlExpr::column(alias)])
    }

    pub fn filter(aggregate: SqlExpr, condition: SqlExpr) -> Self {
        Self::call(Operator::filter(), vec![aggregate, condition])
    }

    /// `call OVER window`, where `window` is either [`SqlExpr::window`] or
    /// [`SqlExpr::window_ref`].
    pub fn over(call: SqlExpr, window: SqlExpr) -> Self {
        Self::call(Operator::over(), vec![call, window])
    }

    pub fn window(spec: WindowSpec) -> Self {
        SqlExpr::Window(Box::new(spec))
    }

    pub fn window_ref(name: impl Into<String>) -> Self {
        SqlExpr::column(name)
    }

    pub fn desc(expr: SqlExpr) -> Self {
        Self::call(Operator::postfix("DESC"), vec![expr])
    }

    pub fn query(select: Select) -> Self {
        SqlExpr::Query(Box::new(select))
    }

    pub fn with_span(self, span: Span) -> Self {
        match self {
            SqlExpr::Column(c) => SqlExpr::Column(c.with_span(span)),
            SqlExpr::Call(c) => SqlExpr::Call(c.with_span(span)),
            SqlExpr::Window(w) => SqlExpr::Window(Box::new(w.with_span(span))),
            SqlExpr::Query(q) => SqlExpr::Query(Box::new(q.with_span(span))),
            other => other,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            SqlExpr::Literal(_) | SqlExpr::Symbol(_) => Span::default(),
            SqlExpr::Column(c) => c.span,
            SqlExpr::Call(c) => c.span,
            SqlExpr::Window(w) => w.span,
            SqlExpr::Query(q) => q.span,
        }
    }

    pub fn as_column(&self) -> Option<&ColumnRef> {
        match self {
            SqlExpr::Column(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&Call> {
        match self {
            SqlExpr::Call(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_star(&self) -> bool {
        matches!(self, SqlExpr::Column(c) if c.is_star())
    }

    /// Removes one `AS` wrapper, if present.
    pub fn strip_as(&self) -> &SqlExpr {
        match self {
            SqlExpr::Call(call) if call.kind() == OperatorKind::As => call.operand(0).unwrap_or(self),
            _ => self,
        }
    }

    /// Alias name of an `expr AS alias` item.
    pub fn alias_name(&self) -> Option<&str> {
        match self {
            SqlExpr::Call(call) if call.kind() == OperatorKind::As => {
                call.operand(1).and_then(SqlExpr::as_column).and_then(ColumnRef::simple_name)
            }
            _ => None,
        }
    }

    /// Operands a generic traversal descends into; empty for leaves and subqueries.
    pub fn expression_operands(&self) -> Vec<&SqlExpr> {
        match self {
            SqlExpr::Call(call) => call.expression_operands(),
            SqlExpr::Window(window) => window.expression_operands(),
            SqlExpr::Literal(_) | SqlExpr::Symbol(_) | SqlExpr::Column(_) | SqlExpr::Query(_) => Vec::new(),
        }
    }

    /// Structural equality: same shape, same operators, same literals;
    /// identifiers compared through `matcher`; spans ignored.
    pub fn equals_deep(&self, other: &SqlExpr, matcher: NameMatcher) -> bool {
        match (self, other) {
            (SqlExpr::Literal(a), SqlExpr::Literal(b)) => a == b,
            (SqlExpr::Symbol(a), SqlExpr::Symbol(b)) => a.eq_ignore_ascii_case(b),
            (SqlExpr::Column(a), SqlExpr::Column(b)) => a.equals_deep(b, matcher),
            (SqlExpr::Call(a), SqlExpr::Call(b)) => a.equals_deep(b, matcher),
            (SqlExpr::Window(a), SqlExpr::Window(b)) => a.equals_deep(b, matcher),
            (SqlExpr::Query(a), SqlExpr::Query(b)) => a.equals_deep(b, matcher),
            _ => false,
        }
    }

    pub fn all_equal_deep(a: &[SqlExpr], b: &[SqlExpr], matcher: NameMatcher) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals_deep(y, matcher))
    }

    pub fn join(items: &[SqlExpr]) -> String {
        items.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", ")
    }
}

impl From<ColumnRef> for SqlExpr {
    fn from(column: ColumnRef) -> Self {
        SqlExpr::Column(column)
    }
}

impl From<Call> for SqlExpr {
    fn from(call: Call) -> Self {
        SqlExpr::Call(call)
    }
}

impl fmt::Display for SqlExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlExpr::Literal(l) => write!(f, "{}", l),
            SqlExpr::Symbol(s) => write!(f, "{}", s),
            SqlExpr::Column(c) => write!(f, "{}", c),
            SqlExpr::Call(c) => write!(f, "{}", c),
            SqlExpr::Window(w) => write!(f, "{}", w),
            SqlExpr::Query(q) => write!(f, "({})", q),
        }
    }
}

impl fmt::Debug for SqlExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlExpr::Literal(l) => write!(f, "{:?}", l),
            SqlExpr::Symbol(s) => write!(f, "Symbol({})", s),
            SqlExpr::Column(c) => write!(f, "{:?}", c),
            SqlExpr::Call(c) => write!(f, "{:?}", c),
            SqlExpr::Window(w) => write!(f, "{:?}", w),
            SqlExpr::Query(q) => write!(f, "Query({})", q),
        }
    }
}

use crate::ast::{NameMatcher, SqlExpr};

/// Expressions that may be referenced without aggregation: the GROUP BY list,
/// or the select list of a SELECT DISTINCT.
#[derive(Debug, Clone, Default)]
pub struct GroupExprSet {
    exprs: Vec<SqlExpr>,
    matcher: NameMatcher,
}

impl GroupExprSet {
    pub fn new(exprs: Vec<SqlExpr>, matcher: NameMatcher) -> Self {
        Self { exprs, matcher }
    }

    pub fn empty(matcher: NameMatcher) -> Self {
        Self::new(Vec::new(), matcher)
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    pub fn matcher(&self) -> NameMatcher {
        self.matcher
    }

    pub fn contains(&self, expr: &SqlExpr) -> bool {
        self.exprs.iter().any(|group_expr| group_expr.equals_deep(expr, self.matcher))
    }
}

use crate::ast::{OperatorKind, Select, SqlExpr};

pub struct AggregateFinder;

impl AggregateFinder {
    /// First aggregate call in `expr`. Windowed aggregates (`SUM(x) OVER w`)
    /// and subqueries are not grouping aggregates and are not searched.
    pub fn find_aggregate(expr: &SqlExpr) -> Option<&SqlExpr> {
        match expr {
            SqlExpr::Call(call) => match call.kind() {
                OperatorKind::Aggregate => Some(expr),
                OperatorKind::Over => None,
                OperatorKind::Filter | OperatorKind::As | OperatorKind::Scalar => {
                    call.expression_operands().into_iter().find_map(Self::find_aggregate)
                }
            },
            SqlExpr::Literal(_) | SqlExpr::Symbol(_) | SqlExpr::Column(_)
            | SqlExpr::Window(_) | SqlExpr::Query(_) => None,
        }
    }

    pub fn contains_aggregate(expr: &SqlExpr) -> bool {
        Self::find_aggregate(expr).is_some()
    }

    /// A select is aggregating when it groups, filters groups, or aggregates
    /// in its select list.
    pub fn is_aggregate_select(select: &Select) -> bool {
        !select.group_by.is_empty()
            || select.having.is_some()
            || select.select_list.iter().any(Self::contains_aggregate)
    }
}

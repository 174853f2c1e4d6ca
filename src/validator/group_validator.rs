use tracing::{debug, trace};

use crate::{
    ast::{Select, SqlExpr},
    catalog::SchemaProvider,
    validator::{
        AggChecker, AggregateFinder, ExpansionMap, Expander, GroupExprSet, OperatorResolver, OperatorTable,
        OrderByResolver, Scope, SelectScope, ValidatorConfig, ValidatorError,
    },
};

/// Validates the grouping rules of a whole SELECT: what may appear in the
/// select list, HAVING and ORDER BY of a grouped or DISTINCT query.
pub struct GroupValidator<'a> {
    schemas: &'a dyn SchemaProvider,
    operators: &'a dyn OperatorResolver,
    config: &'a ValidatorConfig,
}

impl<'a> GroupValidator<'a> {
    /// Validator over `schemas` using the standard operator table.
    pub fn new(schemas: &'a dyn SchemaProvider, config: &'a ValidatorConfig) -> Self {
        Self { schemas, operators: OperatorTable::standard(), config }
    }

    pub fn with_operators(mut self, operators: &'a dyn OperatorResolver) -> Self {
        self.operators = operators;
        self
    }

    pub fn validate(&self, select: &Select) -> Result<(), ValidatorError> {
        let aggregate = AggregateFinder::is_aggregate_select(select);
        debug!(%select, aggregate, distinct = select.distinct, "validating grouping");

        if let Some(found) = select.group_by.iter().find_map(AggregateFinder::find_aggregate) {
            return Err(ValidatorError::AggregateIllegalInGroupBy { expr: found.to_string(), span: found.span() });
        }

        if !aggregate && !select.distinct {
            trace!("not an aggregating select; nothing to check");
            return Ok(());
        }

        let matcher = self.config.name_matcher();
        let scope = SelectScope::new(select, self.schemas, matcher)?.aggregating(true);
        let expander = Expander::new(&scope, self.operators, self.config);
        let order_items = OrderByResolver::resolve_order_by(&select.order_by, &select.select_list, self.config)?;

        if aggregate {
            let group_exprs = GroupExprSet::new(Self::expand_all(&expander, &select.group_by)?, matcher);
            // DISTINCT queries check their ORDER BY against the select list below
            let order_checked: &[SqlExpr] = if select.distinct { &[] } else { &order_items };
            let sources: Vec<&SqlExpr> = select.select_list.iter()
                .chain(&select.having)
                .chain(order_checked)
                .collect();
            let expanded = Self::expand_all(&expander, sources.iter().copied())?;

            debug!(group_exprs = group_exprs.len(), items = expanded.len(), "checking grouped select");
            self.check_all(&scope, group_exprs, false, &expanded, &sources)?;
        }

        if select.distinct {
            let mut distinct_exprs = Vec::with_capacity(select.select_list.len());
            for item in &select.select_list {
                match item.strip_as() {
                    SqlExpr::Column(star) if star.is_star() => {
                        distinct_exprs.extend(scope.star_columns(star)?.into_iter().map(SqlExpr::Column));
                    }
                    expr => distinct_exprs.push(expander.expand(expr)?),
                }
            }
            let distinct_exprs = GroupExprSet::new(distinct_exprs, matcher);
            let sources: Vec<&SqlExpr> = order_items.iter().collect();
            let expanded = Self::expand_all(&expander, sources.iter().copied())?;

            debug!(distinct_exprs = distinct_exprs.len(), items = expanded.len(), "checking distinct order by");
            self.check_all(&scope, distinct_exprs, true, &expanded, &sources)?;
        }

        Ok(())
    }

    fn expand_all<'s>(expander: &Expander<'_>, exprs: impl IntoIterator<Item = &'s SqlExpr>) -> Result<Vec<SqlExpr>, ValidatorError> {
        exprs.into_iter().map(|expr| expander.expand(expr)).collect()
    }

    /// Check each expanded item; each one reports violations through its
    /// own expansion record, never through another item's.
    fn check_all(
        &self,
        scope: &dyn Scope,
        group_exprs: GroupExprSet,
        distinct: bool,
        expanded: &[SqlExpr],
        sources: &[&SqlExpr],
    ) -> Result<(), ValidatorError> {
        let records: Vec<ExpansionMap<'_>> = expanded.iter().zip(sources)
            .map(|(expr, source)| {
                let mut originals = ExpansionMap::new();
                originals.record(expr, source);
                originals
            })
            .collect();
        let unrecorded = ExpansionMap::new();
        let mut checker = AggChecker::new(scope, group_exprs, distinct, self.operators, &unrecorded, self.config);
        for (expr, originals) in expanded.iter().zip(&records) {
            checker.check_expanded(expr, originals)?;
        }
        Ok(())
    }
}

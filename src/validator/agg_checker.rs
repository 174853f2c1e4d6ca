use tracing::{debug, trace};

use crate::{
    ast::{Call, ColumnRef, OperatorKind, SqlExpr},
    validator::{GroupExprSet, OperatorResolver, OriginalExprs, Scope, ScopeStack, ValidatorConfig, ValidatorError},
};

/// Rejects any part of an expression that is neither a grouping expression
/// nor contained in an aggregate.
///
/// One checker serves one query: build it with the query's aggregating
/// scope and its grouping expressions, then [`AggChecker::check`] each select
/// item, the HAVING condition and each ORDER BY item. When checking for
/// SELECT DISTINCT, the grouping expressions are the expanded select items.
pub struct AggChecker<'a> {
    scopes: ScopeStack<'a>,
    group_exprs: GroupExprSet,
    /// Checking because of SELECT DISTINCT rather than GROUP BY.
    distinct: bool,
    operators: &'a dyn OperatorResolver,
    originals: &'a dyn OriginalExprs,
    config: &'a ValidatorConfig,
}

impl<'a> AggChecker<'a> {
    pub fn new(
        scope: &'a dyn Scope,
        group_exprs: GroupExprSet,
        distinct: bool,
        operators: &'a dyn OperatorResolver,
        originals: &'a dyn OriginalExprs,
        config: &'a ValidatorConfig,
    ) -> Self {
        Self { scopes: ScopeStack::new(scope), group_exprs, distinct, operators, originals, config }
    }

    pub fn is_group_expr(&self, expr: &SqlExpr) -> bool {
        self.group_exprs.contains(expr)
    }

    /// Current depth of the scope stack; 1 between checks.
    pub fn depth(&self) -> usize {
        self.scopes.depth()
    }

    /// Check an expression whose violations are reported through `originals`,
    /// the expansion record of that expression.
    pub fn check_expanded(&mut self, expr: &SqlExpr, originals: &'a dyn OriginalExprs) -> Result<(), ValidatorError> {
        self.originals = originals;
        self.check(expr)
    }

    pub fn check(&mut self, expr: &SqlExpr) -> Result<(), ValidatorError> {
        debug!(expr = %expr, distinct = self.distinct, "checking grouped expression");
        let result = self.visit(expr);
        if let Err(err) = &result {
            debug!(error = %err, "grouping check failed");
        }
        result
    }

    fn visit(&mut self, expr: &SqlExpr) -> Result<(), ValidatorError> {
        match expr {
            SqlExpr::Literal(_) | SqlExpr::Symbol(_) => Ok(()),
            SqlExpr::Column(column) => self.visit_column(expr, column),
            SqlExpr::Call(call) => self.visit_call(expr, call),
            SqlExpr::Window(_) => self.visit_invocation(expr),
            // Subqueries may reference anything; they are validated on their own.
            SqlExpr::Query(_) => {
                trace!(expr = %expr, "subquery accepted");
                Ok(())
            }
        }
    }

    fn visit_column(&mut self, expr: &SqlExpr, column: &ColumnRef) -> Result<(), ValidatorError> {
        // Star may validly occur in "SELECT COUNT(*) OVER w"
        if column.is_star() || self.is_group_expr(expr) {
            return Ok(());
        }

        // Is it a call to a parenthesis-free function?
        if self.config.niladic_functions {
            if let Some(call) = self.operators.resolve_niladic(column) {
                trace!(column = %column, "identifier read as niladic call");
                return self.visit(&SqlExpr::Call(call));
            }
        }

        // Not in the group-by list as is; try it fully qualified.
        let qualified = self.scopes.peek().fully_qualify(column)?;
        if self.is_group_expr(&SqlExpr::Column(qualified)) {
            return Ok(());
        }

        Err(self.violation(expr, self.distinct))
    }

    fn visit_call(&mut self, expr: &SqlExpr, call: &Call) -> Result<(), ValidatorError> {
        let scope = self.scopes.peek();
        match call.kind() {
            OperatorKind::Aggregate => return self.visit_aggregate(expr, scope),
            OperatorKind::Filter => {
                // Only the filtered aggregate; the condition is not a grouping concern.
                return match call.operand(0) {
                    Some(aggregate) => self.visit(aggregate),
                    None => Ok(()),
                };
            }
            OperatorKind::Over => self.visit_over(call, scope)?,
            OperatorKind::As | OperatorKind::Scalar => {}
        }
        self.visit_invocation(expr)
    }

    /// For example, `SUM(sal)` in `SELECT SUM(sal) FROM emp GROUP BY deptno`.
    /// Under DISTINCT the aggregate must also be one of the select items.
    fn visit_aggregate(&self, expr: &SqlExpr, scope: &'a dyn Scope) -> Result<(), ValidatorError> {
        if !self.distinct {
            trace!(expr = %expr, "aggregate accepted");
            return Ok(());
        }

        if scope.aggregating_select().is_some() && self.is_group_expr(expr) {
            return Ok(());
        }

        // Cannot use an aggregate in ORDER BY of a SELECT DISTINCT unless it is selected.
        Err(self.violation(expr, true))
    }

    fn visit_over(&mut self, call: &Call, scope: &'a dyn Scope) -> Result<(), ValidatorError> {
        if let Some(SqlExpr::Call(windowed)) = call.operand(0) {
            for operand in &windowed.operands {
                self.visit(operand)?;
            }
        }

        match call.operand(1) {
            Some(inline @ SqlExpr::Window(window)) => {
                self.visit(inline)?;
                match &window.reference {
                    Some(base) => self.visit_named_window(base, scope),
                    None => Ok(()),
                }
            }
            Some(SqlExpr::Column(reference)) => {
                let name = reference.simple_name()
                    .ok_or_else(|| ValidatorError::UnknownWindow(reference.to_string()))?;
                self.visit_named_window(name, scope)
            }
            _ => Ok(()),
        }
    }

    /// Visit the partition and order items of the window declared as `name`
    /// and of every window it extends.
    fn visit_named_window(&mut self, name: &str, scope: &'a dyn Scope) -> Result<(), ValidatorError> {
        let mut window = scope.lookup_window(name)?;
        let mut seen = vec![window];
        loop {
            for item in window.partition_by.iter().chain(&window.order_by) {
                self.visit(item)?;
            }
            let Some(base) = window.reference.as_deref() else {
                return Ok(());
            };
            window = scope.lookup_window(base)?;
            // a cycle in the WINDOW clause
            if seen.iter().any(|w| std::ptr::eq(*w, window)) {
                return Ok(());
            }
            seen.push(window);
        }
    }

    fn visit_invocation(&mut self, expr: &SqlExpr) -> Result<(), ValidatorError> {
        if self.is_group_expr(expr) {
            return Ok(());
        }

        let operand_scope = self.scopes.peek().operand_scope(expr);
        self.scopes.push(operand_scope);
        let result = self.visit_operands(expr.expression_operands());
        let restored = self.scopes.pop(operand_scope);
        result.and(restored)
    }

    fn visit_operands(&mut self, operands: Vec<&SqlExpr>) -> Result<(), ValidatorError> {
        for operand in operands {
            self.visit(operand)?;
        }
        Ok(())
    }

    fn violation(&self, expr: &SqlExpr, distinct: bool) -> ValidatorError {
        let original = self.originals.original(expr).unwrap_or(expr);
        let text = original.to_string();
        let span = original.span();
        if distinct {
            ValidatorError::NotSelectDistinctExpression { expr: text, span }
        } else {
            ValidatorError::NotGroupExpression { expr: text, span }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::{NameMatcher, Operator, Select, Span, WindowSpec},
        catalog::Catalog,
        validator::{ExpansionMap, OperatorTable, SelectScope},
    };

    fn catalog() -> Catalog {
        Catalog::new()
            .with_table("emp", &["empno", "ename", "job", "deptno", "sal", "comm"])
            .with_table("dept", &["deptno", "dname"])
    }

    fn sum(arg: SqlExpr) -> SqlExpr {
        SqlExpr::call(Operator::aggregate("SUM"), vec![arg])
    }

    fn grouped_by(exprs: Vec<SqlExpr>) -> GroupExprSet {
        GroupExprSet::new(exprs, NameMatcher::CaseSensitive)
    }

    #[test]
    fn group_expression_itself_is_valid() {
        let catalog = catalog();
        let select = Select::new().from_table("emp", Some("e"));
        let scope = SelectScope::new(&select, &catalog, NameMatcher::CaseSensitive).expect("scope").aggregating(true);
        let config = ValidatorConfig::default();
        let originals = ExpansionMap::new();
        let plus = SqlExpr::binary("+", SqlExpr::qualified("e", "sal"), SqlExpr::qualified("e", "comm"));
        let mut checker = AggChecker::new(
            &scope, grouped_by(vec![SqlExpr::qualified("e", "deptno"), plus.clone()]),
            false, OperatorTable::standard(), &originals, &config,
        );

        assert!(checker.check(&SqlExpr::qualified("e", "deptno")).is_ok());
        assert!(checker.check(&plus).is_ok());
        assert!(checker.check(&SqlExpr::binary("*", plus, SqlExpr::int(2))).is_ok());
    }

    #[test]
    fn unqualified_reference_matches_qualified_group_expression() {
        let catalog = catalog();
        let select = Select::new().from_table("emp", Some("e"));
        let scope = SelectScope::new(&select, &catalog, NameMatcher::CaseSensitive).expect("scope").aggregating(true);
        let config = ValidatorConfig::default();
        let originals = ExpansionMap::new();
        let mut checker = AggChecker::new(
            &scope, grouped_by(vec![SqlExpr::qualified("e", "deptno")]),
            false, OperatorTable::standard(), &originals, &config,
        );
        assert!(checker.check(&SqlExpr::column("deptno")).is_ok());
    }

    #[test]
    fn ungrouped_column_reports_original_text() {
        let catalog = catalog();
        let select = Select::new().from_table("emp", Some("e"));
        let scope = SelectScope::new(&select, &catalog, NameMatcher::CaseSensitive).expect("scope").aggregating(true);
        let config = ValidatorConfig::default();

        let span = Span::new(7, 10);
        let original = SqlExpr::column("sal").with_span(span);
        let expanded = SqlExpr::qualified("e", "sal").with_span(span);
        let mut originals = ExpansionMap::new();
        originals.record(&expanded, &original);

        let mut checker = AggChecker::new(
            &scope, grouped_by(vec![SqlExpr::qualified("e", "deptno")]),
            false, OperatorTable::standard(), &originals, &config,
        );
        assert_eq!(
            checker.check(&expanded),
            Err(ValidatorError::NotGroupExpression { expr: "sal".into(), span })
        );
        assert_eq!(checker.depth(), 1);
    }

    #[test]
    fn aggregates_are_leaves_under_group_by() {
        let catalog = catalog();
        let select = Select::new().from_table("emp", None);
        let scope = SelectScope::new(&select, &catalog, NameMatcher::CaseSensitive).expect("scope").aggregating(true);
        let config = ValidatorConfig::default();
        let originals = ExpansionMap::new();
        let mut checker = AggChecker::new(
            &scope, grouped_by(vec![SqlExpr::qualified("emp", "deptno")]),
            false, OperatorTable::standard(), &originals, &config,
        );
        assert!(checker.check(&sum(SqlExpr::column("sal"))).is_ok());
        assert!(checker.check(&SqlExpr::binary("/", sum(SqlExpr::column("sal")), SqlExpr::column("deptno"))).is_ok());
    }

    #[test]
    fn filter_condition_is_not_checked() {
        let catalog = catalog();
        let select = Select::new().from_table("emp", None);
        let scope = SelectScope::new(&select, &catalog, NameMatcher::CaseSensitive).expect("scope").aggregating(true);
        let config = ValidatorConfig::default();
        let originals = ExpansionMap::new();
        let mut checker = AggChecker::new(
            &scope, grouped_by(vec![SqlExpr::qualified("emp", "deptno")]),
            false, OperatorTable::standard(), &originals, &config,
        );
        let filtered = SqlExpr::filter(
            sum(SqlExpr::column("sal")),
            SqlExpr::binary(">", SqlExpr::column("comm"), SqlExpr::int(0)),
        );
        assert!(checker.check(&filtered).is_ok());
    }

    #[test]
    fn named_window_partition_must_be_grouped() {
        let catalog = catalog();
        let by_dept = Select::new()
            .from_table("emp", None)
            .window(WindowSpec::named("w").partition_by(vec![SqlExpr::column("deptno")]));
        let by_job = Select::new()
            .from_table("emp", None)
            .window(WindowSpec::named("w").partition_by(vec![SqlExpr::column("job")]));
        let config = ValidatorConfig::default();
        let originals = ExpansionMap::new();
        let rank = SqlExpr::over(SqlExpr::call(Operator::function("RANK"), vec![]), SqlExpr::window_ref("w"));

        let scope = SelectScope::new(&by_dept, &catalog, NameMatcher::CaseSensitive).expect("scope").aggregating(true);
        let mut checker = AggChecker::new(
            &scope, grouped_by(vec![SqlExpr::qualified("emp", "deptno")]),
            false, OperatorTable::standard(), &originals, &config,
        );
        assert!(checker.check(&rank).is_ok());

        let scope = SelectScope::new(&by_job, &catalog, NameMatcher::CaseSensitive).expect("scope").aggregating(true);
        let mut checker = AggChecker::new(
            &scope, grouped_by(vec![SqlExpr::qualified("emp", "deptno")]),
            false, OperatorTable::standard(), &originals, &config,
        );
        assert_eq!(
            checker.check(&rank),
            Err(ValidatorError::NotGroupExpression { expr: "job".into(), span: Span::default() })
        );
    }

    #[test]
    fn inline_window_checks_the_window_it_extends() {
        let catalog = catalog();
        let select = Select::new()
            .from_table("emp", None)
            .window(WindowSpec::named("w").partition_by(vec![SqlExpr::column("job")]))
            .window(WindowSpec::named("w2").extending("w"))
            .window(WindowSpec::named("d").partition_by(vec![SqlExpr::column("deptno")]));
        let scope = SelectScope::new(&select, &catalog, NameMatcher::CaseSensitive).expect("scope").aggregating(true);
        let config = ValidatorConfig::default();
        let originals = ExpansionMap::new();
        let mut checker = AggChecker::new(
            &scope, grouped_by(vec![SqlExpr::qualified("emp", "deptno")]),
            false, OperatorTable::standard(), &originals, &config,
        );
        let rank = |window: SqlExpr| SqlExpr::over(SqlExpr::call(Operator::function("RANK"), vec![]), window);

        let extends_w = WindowSpec::new().extending("w").order_by(vec![SqlExpr::column("deptno")]);
        assert_eq!(
            checker.check(&rank(SqlExpr::window(extends_w))),
            Err(ValidatorError::NotGroupExpression { expr: "job".into(), span: Span::default() })
        );
        assert_eq!(checker.depth(), 1);

        // w2 adds nothing itself; the violation comes from w
        assert!(checker.check(&rank(SqlExpr::window_ref("w2"))).is_err());

        let extends_d = WindowSpec::new().extending("d").order_by(vec![SqlExpr::column("deptno")]);
        assert!(checker.check(&rank(SqlExpr::window(extends_d))).is_ok());

        let extends_missing = WindowSpec::new().extending("nope");
        assert_eq!(
            checker.check(&rank(SqlExpr::window(extends_missing))),
            Err(ValidatorError::UnknownWindow("nope".into()))
        );
    }

    #[test]
    fn cyclic_window_references_terminate() {
        let catalog = catalog();
        let select = Select::new()
            .from_table("emp", None)
            .window(WindowSpec::named("a").extending("b").partition_by(vec![SqlExpr::column("deptno")]))
            .window(WindowSpec::named("b").extending("a"));
        let scope = SelectScope::new(&select, &catalog, NameMatcher::CaseSensitive).expect("scope").aggregating(true);
        let config = ValidatorConfig::default();
        let originals = ExpansionMap::new();
        let mut checker = AggChecker::new(
            &scope, grouped_by(vec![SqlExpr::qualified("emp", "deptno")]),
            false, OperatorTable::standard(), &originals, &config,
        );
        let rank = SqlExpr::over(SqlExpr::call(Operator::function("RANK"), vec![]), SqlExpr::window_ref("a"));
        assert!(checker.check(&rank).is_ok());
    }

    #[test]
    fn undefined_window_is_a_framework_error() {
        let catalog = catalog();
        let select = Select::new().from_table("emp", None);
        let scope = SelectScope::new(&select, &catalog, NameMatcher::CaseSensitive).expect("scope").aggregating(true);
        let config = ValidatorConfig::default();
        let originals = ExpansionMap::new();
        let mut checker = AggChecker::new(
            &scope, GroupExprSet::empty(NameMatcher::CaseSensitive),
            false, OperatorTable::standard(), &originals, &config,
        );
        let rank = SqlExpr::over(SqlExpr::call(Operator::function("RANK"), vec![]), SqlExpr::window_ref("nope"));
        assert_eq!(checker.check(&rank), Err(ValidatorError::UnknownWindow("nope".into())));
    }

    #[test]
    fn window_function_arguments_must_be_grouped() {
        let catalog = catalog();
        let select = Select::new().from_table("emp", None);
        let scope = SelectScope::new(&select, &catalog, NameMatcher::CaseSensitive).expect("scope").aggregating(true);
        let config = ValidatorConfig::default();
        let originals = ExpansionMap::new();
        let mut checker = AggChecker::new(
            &scope, grouped_by(vec![SqlExpr::qualified("emp", "deptno")]),
            false, OperatorTable::standard(), &originals, &config,
        );
        let lag = |arg: SqlExpr| SqlExpr::over(
            SqlExpr::call(Operator::function("LAG"), vec![arg]),
            SqlExpr::window(WindowSpec::new().order_by(vec![SqlExpr::column("deptno")])),
        );
        assert!(checker.check(&lag(SqlExpr::column("deptno"))).is_ok());
        assert!(checker.check(&lag(SqlExpr::column("sal"))).is_err());
        assert_eq!(checker.depth(), 1);
    }

    #[test]
    fn subqueries_are_not_entered() {
        let catalog = catalog();
        let select = Select::new().from_table("emp", None);
        let scope = SelectScope::new(&select, &catalog, NameMatcher::CaseSensitive).expect("scope").aggregating(true);
        let config = ValidatorConfig::default();
        let originals = ExpansionMap::new();
        let mut checker = AggChecker::new(
            &scope, GroupExprSet::empty(NameMatcher::CaseSensitive),
            false, OperatorTable::standard(), &originals, &config,
        );
        let sub = SqlExpr::query(Select::new().select(vec![SqlExpr::column("no_such_column")]).from_table("dept", None));
        assert!(checker.check(&sub).is_ok());
        let exists = SqlExpr::call(Operator::prefix("EXISTS"), vec![sub]);
        assert!(checker.check(&exists).is_ok());
    }

    #[test]
    fn niladic_functions_and_stars_are_always_valid() {
        let catalog = catalog();
        let select = Select::new().from_table("emp", None);
        let scope = SelectScope::new(&select, &catalog, NameMatcher::CaseSensitive).expect("scope").aggregating(true);
        let config = ValidatorConfig::default();
        let originals = ExpansionMap::new();
        let mut checker = AggChecker::new(
            &scope, GroupExprSet::empty(NameMatcher::CaseSensitive),
            false, OperatorTable::standard(), &originals, &config,
        );
        assert!(checker.check(&SqlExpr::column("CURRENT_TIMESTAMP")).is_ok());
        assert!(checker.check(&SqlExpr::star()).is_ok());
        assert!(checker.check(&SqlExpr::int(42)).is_ok());
    }

    #[test]
    fn distinct_aggregate_must_echo_a_select_item() {
        let catalog = catalog();
        let select = Select::new()
            .distinct()
            .select(vec![SqlExpr::column("deptno"), SqlExpr::alias(sum(SqlExpr::column("sal")), "total")])
            .from_table("emp", None);
        let scope = SelectScope::new(&select, &catalog, NameMatcher::CaseSensitive).expect("scope").aggregating(true);
        let config = ValidatorConfig::default();
        let originals = ExpansionMap::new();
        let mut checker = AggChecker::new(
            &scope,
            grouped_by(vec![SqlExpr::qualified("emp", "deptno"), sum(SqlExpr::qualified("emp", "sal"))]),
            true, OperatorTable::standard(), &originals, &config,
        );

        assert!(checker.check(&sum(SqlExpr::qualified("emp", "sal"))).is_ok());
        let max = SqlExpr::call(Operator::aggregate("MAX"), vec![SqlExpr::qualified("emp", "sal")]);
        assert_eq!(
            checker.check(&max),
            Err(ValidatorError::NotSelectDistinctExpression { expr: "MAX(emp.sal)".into(), span: Span::default() })
        );
        assert_eq!(
            checker.check(&SqlExpr::qualified("emp", "job")),
            Err(ValidatorError::NotSelectDistinctExpression { expr: "emp.job".into(), span: Span::default() })
        );
    }

    #[test]
    fn distinct_aggregate_outside_aggregating_scope_fails() {
        let catalog = catalog();
        let select = Select::new().distinct().select(vec![sum(SqlExpr::column("sal"))]).from_table("emp", None);
        let scope = SelectScope::new(&select, &catalog, NameMatcher::CaseSensitive).expect("scope");
        let config = ValidatorConfig::default();
        let originals = ExpansionMap::new();
        let mut checker = AggChecker::new(
            &scope, GroupExprSet::empty(NameMatcher::CaseSensitive),
            true, OperatorTable::standard(), &originals, &config,
        );
        assert!(matches!(
            checker.check(&sum(SqlExpr::qualified("emp", "sal"))),
            Err(ValidatorError::NotSelectDistinctExpression { .. })
        ));
    }

    // Scope that sends operands of every call to a separate inner scope, to
    // observe push/pop pairing.
    struct Outer<'s> {
        inner: &'s dyn Scope,
    }

    impl Scope for Outer<'_> {
        fn fully_qualify(&self, column: &ColumnRef) -> Result<ColumnRef, ValidatorError> {
            Ok(column.clone())
        }
        fn lookup_window(&self, name: &str) -> Result<&WindowSpec, ValidatorError> {
            Err(ValidatorError::UnknownWindow(name.to_string()))
        }
        fn operand_scope(&self, _call: &SqlExpr) -> &dyn Scope {
            self.inner
        }
        fn aggregating_select(&self) -> Option<&Select> {
            None
        }
    }

    #[test]
    fn scope_stack_is_restored_after_failure_in_nested_operand() {
        let catalog = catalog();
        let select = Select::new().from_table("emp", None);
        let inner = SelectScope::new(&select, &catalog, NameMatcher::CaseSensitive).expect("scope");
        let outer = Outer { inner: &inner };
        let config = ValidatorConfig::default();
        let originals = ExpansionMap::new();
        let mut checker = AggChecker::new(
            &outer, grouped_by(vec![SqlExpr::qualified("emp", "deptno")]),
            false, OperatorTable::standard(), &originals, &config,
        );

        // operands are qualified by the inner scope: deptno -> emp.deptno
        let ok = SqlExpr::call(Operator::function("ABS"), vec![SqlExpr::column("deptno")]);
        assert!(checker.check(&ok).is_ok());
        assert_eq!(checker.depth(), 1);

        let nested = SqlExpr::call(Operator::function("ABS"), vec![
            SqlExpr::binary("+", SqlExpr::column("deptno"), SqlExpr::column("sal")),
        ]);
        assert_eq!(
            checker.check(&nested),
            Err(ValidatorError::NotGroupExpression { expr: "sal".into(), span: Span::default() })
        );
        assert_eq!(checker.depth(), 1);

        // top-level column is qualified by the outer scope, which leaves it alone
        assert!(checker.check(&SqlExpr::column("deptno")).is_err());
        assert_eq!(checker.depth(), 1);
    }
}

use crate::{
    ast::{Call, SqlExpr, WindowSpec},
    validator::{OperatorResolver, Scope, ValidatorConfig, ValidatorError},
};

/// Rewrites an expression into its fully qualified form: every column
/// reference is qualified through the scope, bare niladic function names
/// become calls. Stars, alias names, window names and subqueries are kept.
pub struct Expander<'a> {
    scope: &'a dyn Scope,
    operators: &'a dyn OperatorResolver,
    config: &'a ValidatorConfig,
}

impl<'a> Expander<'a> {
    pub fn new(scope: &'a dyn Scope, operators: &'a dyn OperatorResolver, config: &'a ValidatorConfig) -> Self {
        Self { scope, operators, config }
    }

    /// Expanded copy of `expr`. The result has the same shape as `expr`, so
    /// an [`ExpansionMap`](crate::validator::ExpansionMap) can pair the two node by node.
    pub fn expand(&self, expr: &SqlExpr) -> Result<SqlExpr, ValidatorError> {
        match expr {
            SqlExpr::Literal(_) | SqlExpr::Symbol(_) | SqlExpr::Query(_) => Ok(expr.clone()),
            SqlExpr::Column(column) if column.is_star() => Ok(expr.clone()),
            SqlExpr::Column(column) => {
                let niladic = if self.config.niladic_functions { self.operators.resolve_niladic(column) } else { None };
                match niladic {
                    Some(call) => Ok(SqlExpr::Call(call)),
                    None => Ok(SqlExpr::Column(self.scope.fully_qualify(column)?)),
                }
            }
            SqlExpr::Call(call) => Ok(SqlExpr::Call(self.expand_call(call)?)),
            SqlExpr::Window(window) => Ok(SqlExpr::Window(Box::new(self.expand_window(window)?))),
        }
    }

    fn expand_call(&self, call: &Call) -> Result<Call, ValidatorError> {
        let mut operands = Vec::with_capacity(call.operands.len());
        for (i, operand) in call.operands.iter().enumerate() {
            if call.is_expression_operand(i) {
                operands.push(self.expand(operand)?);
            } else {
                operands.push(operand.clone());
            }
        }
        Ok(Call { operands, ..call.clone() })
    }

    fn expand_window(&self, window: &WindowSpec) -> Result<WindowSpec, ValidatorError> {
        let partition_by = window.partition_by.iter().map(|item| self.expand(item)).collect::<Result<_, _>>()?;
        let order_by = window.order_by.iter().map(|item| self.expand(item)).collect::<Result<_, _>>()?;
        Ok(WindowSpec { partition_by, order_by, ..window.clone() })
    }
}

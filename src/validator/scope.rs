use crate::{ast::{ColumnRef, Select, SqlExpr, WindowSpec}, validator::ValidatorError};

/// A binding context: the query itself, a subquery, a window's operand list.
///
/// Scopes are owned by whoever drives validation; the checker only borrows them.
pub trait Scope {
    /// Resolve a column reference to its canonical qualified form.
    fn fully_qualify(&self, column: &ColumnRef) -> Result<ColumnRef, ValidatorError>;

    /// Window declared in the WINDOW clause under `name`.
    fn lookup_window(&self, name: &str) -> Result<&WindowSpec, ValidatorError>;

    /// Scope in which the operands of `call` are interpreted.
    fn operand_scope(&self, call: &SqlExpr) -> &dyn Scope;

    /// The SELECT this scope aggregates over, if it is an aggregating select scope.
    fn aggregating_select(&self) -> Option<&Select>;
}

use crate::{
    ast::{Call, Literal, OperatorKind, OperatorSyntax, SqlExpr},
    validator::{ValidatorConfig, ValidatorError},
};

const ORDER_MODIFIERS: &[&str] = &["DESC", "ASC", "NULLS FIRST", "NULLS LAST"];

pub struct OrderByResolver;

impl OrderByResolver {
    /// Replace ORDER BY ordinals (1-based) and select-list aliases with the
    /// select items they stand for. Direction and null-ordering wrappers are kept.
    pub fn resolve_order_by(
        order_by: &[SqlExpr],
        select_list: &[SqlExpr],
        config: &ValidatorConfig,
    ) -> Result<Vec<SqlExpr>, ValidatorError> {
        order_by.iter().map(|item| Self::resolve_item(item, select_list, config)).collect()
    }

    fn is_order_modifier(call: &Call) -> bool {
        call.kind() == OperatorKind::Scalar
            && call.operator.syntax == OperatorSyntax::Postfix
            && call.operands.len() == 1
            && ORDER_MODIFIERS.iter().any(|m| m.eq_ignore_ascii_case(&call.operator.name))
    }

    fn resolve_item(item: &SqlExpr, select_list: &[SqlExpr], config: &ValidatorConfig) -> Result<SqlExpr, ValidatorError> {
        match item {
            SqlExpr::Call(call) if Self::is_order_modifier(call) => {
                let inner = Self::resolve_item(&call.operands[0], select_list, config)?;
                Ok(SqlExpr::Call(Call { operands: vec![inner], ..call.clone() }))
            }

            // positional (1-based)
            SqlExpr::Literal(Literal::Int(position)) if config.order_by_ordinals => {
                let index = usize::try_from(*position).ok()
                    .filter(|p| (1..=select_list.len()).contains(p))
                    .ok_or(ValidatorError::OrderByOrdinalOutOfRange { position: *position, len: select_list.len() })?;
                Ok(select_list[index - 1].strip_as().clone())
            }

            // alias match: only when bare column name
            SqlExpr::Column(column) if config.order_by_aliases => {
                let matcher = config.name_matcher();
                let aliased = column.simple_name().and_then(|name| {
                    select_list.iter().find(|s| s.alias_name().is_some_and(|alias| matcher.matches(alias, name)))
                });
                Ok(aliased.map(|s| s.strip_as().clone()).unwrap_or_else(|| item.clone()))
            }

            _ => Ok(item.clone()),
        }
    }
}

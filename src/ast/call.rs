use std::fmt;

use crate::ast::{NameMatcher, Operator, OperatorKind, OperatorSyntax, Span, SqlExpr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    Distinct,
    All,
}

/// An operator applied to an ordered list of operands.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Call {
    pub operator: Operator,
    pub operands: Vec<SqlExpr>,
    pub quantifier: Option<Quantifier>,
    pub span: Span,
}

impl Call {
    pub fn new(operator: Operator, operands: Vec<SqlExpr>) -> Self {
        Self { operator, operands, quantifier: None, span: Span::default() }
    }

    pub fn with_quantifier(mut self, quantifier: Quantifier) -> Self {
        self.quantifier = Some(quantifier);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn kind(&self) -> OperatorKind {
        self.operator.kind
    }

    pub fn operand(&self, index: usize) -> Option<&SqlExpr> {
        self.operands.get(index)
    }

    /// Whether operand `index` is an expression that must itself satisfy
    /// grouping rules. Symbols never are; `AS` only exposes the aliased
    /// expression; `OVER` hides a window referenced by name.
    pub fn is_expression_operand(&self, index: usize) -> bool {
        match self.operands.get(index) {
            None | Some(SqlExpr::Symbol(_)) => false,
            Some(operand) => match self.operator.kind {
                OperatorKind::As => index == 0,
                OperatorKind::Over => !(index == 1 && matches!(operand, SqlExpr::Column(_))),
                _ => true,
            },
        }
    }

    pub fn expression_operands(&self) -> Vec<&SqlExpr> {
        self.operands
            .iter()
            .enumerate()
            .filter(|(i, _)| self.is_expression_operand(*i))
            .map(|(_, operand)| operand)
            .collect()
    }

    pub fn equals_deep(&self, other: &Call, matcher: NameMatcher) -> bool {
        self.operator.same_as(&other.operator)
            && self.quantifier == other.quantifier
            && self.operands.len() == other.operands.len()
            && self.operands.iter().zip(&other.operands).all(|(a, b)| a.equals_deep(b, matcher))
    }

    fn write_operand(f: &mut fmt::Formatter<'_>, operand: &SqlExpr) -> fmt::Result {
        match operand {
            SqlExpr::Call(inner) if inner.operator.syntax == OperatorSyntax::Binary => write!(f, "({})", inner),
            other => write!(f, "{}", other),
        }
    }

    fn write_special(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let first = self.operands.first();
        let second = self.operands.get(1);
        match (self.operator.kind, first, second) {
            (OperatorKind::Filter, Some(agg), Some(cond)) => write!(f, "{} FILTER (WHERE {})", agg, cond),
            (OperatorKind::Over, Some(call), Some(window)) => write!(f, "{} OVER {}", call, window),
            (OperatorKind::As, Some(expr), Some(alias)) => write!(f, "{} AS {}", expr, alias),
            _ => self.write_function(f),
        }
    }

    fn write_function(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.operator.name)?;
        match self.quantifier {
            Some(Quantifier::Distinct) => write!(f, "DISTINCT ")?,
            Some(Quantifier::All) => write!(f, "ALL ")?,
            None => {}
        }
        for (i, operand) in self.operands.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", operand)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator.syntax {
            OperatorSyntax::Function => self.write_function(f),
            OperatorSyntax::FunctionId => write!(f, "{}", self.operator.name),
            OperatorSyntax::Special => self.write_special(f),
            OperatorSyntax::Binary => {
                for (i, operand) in self.operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {} ", self.operator.name)?;
                    }
                    Self::write_operand(f, operand)?;
                }
                Ok(())
            }
            OperatorSyntax::Prefix => {
                write!(f, "{}", self.operator.name)?;
                for operand in &self.operands {
                    write!(f, " ")?;
                    Self::write_operand(f, operand)?;
                }
                Ok(())
            }
            OperatorSyntax::Postfix => {
                for operand in &self.operands {
                    Self::write_operand(f, operand)?;
                    write!(f, " ")?;
                }
                write!(f, "{}", self.operator.name)
            }
        }
    }
}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Call({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ColumnRef, Literal};

    fn col(name: &str) -> SqlExpr {
        SqlExpr::Column(ColumnRef::simple(name))
    }

    #[test]
    fn renders_each_syntax() {
        let sum = Call::new(Operator::aggregate("SUM"), vec![col("sal")]).with_quantifier(Quantifier::Distinct);
        assert_eq!(sum.to_string(), "SUM(DISTINCT sal)");

        let plus = Call::new(Operator::binary("+"), vec![col("a"), SqlExpr::Literal(Literal::Int(1))]);
        let times = Call::new(Operator::binary("*"), vec![SqlExpr::Call(plus), col("b")]);
        assert_eq!(times.to_string(), "(a + 1) * b");

        let not = Call::new(Operator::prefix("NOT"), vec![col("flag")]);
        assert_eq!(not.to_string(), "NOT flag");

        let desc = Call::new(Operator::postfix("DESC"), vec![col("sal")]);
        assert_eq!(desc.to_string(), "sal DESC");

        assert_eq!(Call::new(Operator::niladic("CURRENT_DATE"), vec![]).to_string(), "CURRENT_DATE");
    }

    #[test]
    fn alias_only_exposes_first_operand() {
        let alias = Call::new(Operator::alias(), vec![col("deptno"), col("d")]);
        assert!(alias.is_expression_operand(0));
        assert!(!alias.is_expression_operand(1));
        assert_eq!(alias.expression_operands(), vec![&col("deptno")]);
        assert_eq!(alias.to_string(), "deptno AS d");
    }

    #[test]
    fn over_hides_named_window_and_symbols_are_skipped() {
        let rank = SqlExpr::Call(Call::new(Operator::function("RANK"), vec![]));
        let over = Call::new(Operator::over(), vec![rank.clone(), col("w")]);
        assert_eq!(over.expression_operands(), vec![&rank]);

        let trim = Call::new(Operator::function("TRIM"), vec![SqlExpr::Symbol("BOTH".into()), col("name")]);
        assert_eq!(trim.expression_operands(), vec![&col("name")]);
    }

    #[test]
    fn deep_equality_compares_operator_quantifier_and_operands() {
        let a = Call::new(Operator::aggregate("sum"), vec![col("SAL")]);
        let b = Call::new(Operator::aggregate("SUM"), vec![col("sal")]).with_span(Span::new(3, 11));
        assert!(a.equals_deep(&b, NameMatcher::CaseInsensitive));
        assert!(!a.equals_deep(&b, NameMatcher::CaseSensitive));

        let distinct = b.clone().with_quantifier(Quantifier::Distinct);
        assert!(!distinct.equals_deep(&b, NameMatcher::CaseInsensitive));
    }
}

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::ast::{Call, ColumnRef, Operator, OperatorSyntax};

/// Reinterprets a bare identifier as a parenthesis-free function call.
pub trait OperatorResolver {
    fn resolve_niladic(&self, column: &ColumnRef) -> Option<Call>;
}

const AGGREGATES: &[&str] = &[
    "COUNT", "SUM", "AVG", "MIN", "MAX", "EVERY", "SOME", "ANY_VALUE",
    "STDDEV_POP", "STDDEV_SAMP", "VAR_POP", "VAR_SAMP", "COLLECT",
];

const NILADIC: &[&str] = &[
    "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "LOCALTIME", "LOCALTIMESTAMP",
    "CURRENT_USER", "SESSION_USER", "SYSTEM_USER", "USER", "CURRENT_ROLE",
    "CURRENT_PATH", "CURRENT_CATALOG", "CURRENT_SCHEMA",
];

static STANDARD: Lazy<OperatorTable> = Lazy::new(OperatorTable::build_standard);

/// Case-insensitive registry of named operators.
#[derive(Debug, Clone, Default)]
pub struct OperatorTable {
    by_name: IndexMap<String, Operator>,
}

impl OperatorTable {
    pub fn new() -> Self {
        Self { by_name: IndexMap::new() }
    }

    /// Shared table with the standard aggregates and niladic functions.
    pub fn standard() -> &'static OperatorTable {
        &STANDARD
    }

    fn build_standard() -> Self {
        let mut table = Self::new();
        for name in AGGREGATES {
            table.register(Operator::aggregate(*name));
        }
        for name in NILADIC {
            table.register(Operator::niladic(*name));
        }
        table
    }

    pub fn register(&mut self, operator: Operator) {
        self.by_name.insert(operator.name.to_ascii_uppercase(), operator);
    }

    pub fn get(&self, name: &str) -> Option<&Operator> {
        self.by_name.get(&name.to_ascii_uppercase())
    }

}

impl OperatorResolver for OperatorTable {
    fn resolve_niladic(&self, column: &ColumnRef) -> Option<Call> {
        let name = column.simple_name()?;
        let operator = self.get(name)?;
        if operator.syntax != OperatorSyntax::FunctionId {
            return None;
        }
        Some(Call::new(operator.clone(), Vec::new()).with_span(column.span))
    }
}

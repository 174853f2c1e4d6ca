use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::{catalog::{SchemaProvider, TableSchema}, validator::ValidatorError};

/// In-memory set of table schemas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    tables: IndexMap<String, TableSchema>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&mut self, schema: TableSchema) {
        self.tables.insert(schema.name.clone(), schema);
    }

    pub fn with_table(mut self, name: &str, columns: &[&str]) -> Self {
        self.add_table(TableSchema::new(name, columns));
        self
    }

    pub fn list(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    /// Build a catalog from a JSON object mapping table names to arrays of
    /// column names:
    ///
    /// ```json
    /// { "emp": ["empno", "ename", "deptno", "sal"], "dept": ["deptno", "dname"] }
    /// ```
    pub fn from_json(value: &Value) -> Result<Self, ValidatorError> {
        let tables = value.as_object()
            .ok_or_else(|| ValidatorError::InvalidCatalog("expected an object of tables".into()))?;

        let mut catalog = Self::new();
        for (table, columns) in tables {
            let columns = columns.as_array().ok_or_else(|| {
                ValidatorError::InvalidCatalog(format!("columns of '{}' must be an array", table))
            })?;
            let mut schema = TableSchema { name: table.clone(), ..TableSchema::default() };
            for column in columns {
                let name = column.as_str().ok_or_else(|| {
                    ValidatorError::InvalidCatalog(format!("column names of '{}' must be strings", table))
                })?;
                schema.columns.insert(name.to_string());
            }
            catalog.add_table(schema);
        }

        debug!(tables = catalog.tables.len(), "catalog loaded");
        Ok(catalog)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ValidatorError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| ValidatorError::InvalidCatalog(e.to_string()))?;
        Self::from_json(&value)
    }
}

impl SchemaProvider for Catalog {
    fn schema_of(&self, table: &str) -> Option<&TableSchema> {
        self.tables.get(table)
            .or_else(|| self.tables.values().find(|t| t.name.eq_ignore_ascii_case(table)))
    }
}

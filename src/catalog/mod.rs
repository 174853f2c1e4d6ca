pub mod table_schema;
pub use table_schema::*;

pub mod memory_catalog;
pub use memory_catalog::*;

pub trait SchemaProvider {
    /// Given a table name as written in a FROM clause, return its schema if known.
    fn schema_of(&self, table: &str) -> Option<&TableSchema>;
}

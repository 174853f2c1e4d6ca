pub mod ast;
pub use ast::{ColumnRef, NameMatcher, Select, SqlExpr};

pub mod catalog;
pub use catalog::{Catalog, SchemaProvider, TableSchema};

pub mod validator;
pub use validator::{AggChecker, GroupValidator, ValidatorConfig, ValidatorError};

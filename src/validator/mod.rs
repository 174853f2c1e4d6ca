pub mod validator_error;
pub use validator_error::*;

pub mod validator_config;
pub use validator_config::*;

pub mod scope;
pub use scope::*;

pub mod scope_stack;
pub use scope_stack::*;

pub mod select_scope;
pub use select_scope::*;

pub mod group_expr_set;
pub use group_expr_set::*;

pub mod original_exprs;
pub use original_exprs::*;

pub mod operator_table;
pub use operator_table::*;

pub mod aggregate_finder;
pub use aggregate_finder::*;

pub mod expander;
pub use expander::*;

pub mod order_by_resolver;
pub use order_by_resolver::*;

pub mod agg_checker;
pub use agg_checker::*;

pub mod group_validator;
pub use group_validator::*;

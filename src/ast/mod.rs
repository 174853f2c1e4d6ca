pub mod span;
pub use span::*;

pub mod literal;
pub use literal::*;

pub mod name_matcher;
pub use name_matcher::*;

pub mod column;
pub use column::*;

pub mod operator;
pub use operator::*;

pub mod call;
pub use call::*;

pub mod window;
pub use window::*;

pub mod select;
pub use select::*;

pub mod sql_expr;
pub use sql_expr::*;

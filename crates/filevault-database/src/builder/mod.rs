//! SQL composition from the configured schema descriptor.

pub mod ddl;
pub mod queries;
pub mod statement;

pub use queries::QueryBuilder;
pub use statement::{BindValue, RenderedStatement, Statement};

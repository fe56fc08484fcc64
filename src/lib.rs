pub mod error;
pub mod types;
pub mod progress;
pub mod schema_flattener;
pub mod loader;
pub mod export;

pub use error::{FlattenError, FlattenResult};
pub use schema_flattener::{FlattenOptions, SchemaFlattener};
pub use types::{ColumnRecord, SchemaTable, TableSummary};

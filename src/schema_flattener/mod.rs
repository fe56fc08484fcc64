// Schema flattener module
pub mod constraints;
pub mod fields;
pub mod flattener;


pub use constraints::KeyIndex;
pub use flattener::*;

pub mod execution;
pub mod pagination;
pub mod records;

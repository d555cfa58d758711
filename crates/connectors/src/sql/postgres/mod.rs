pub mod bounds;
pub mod query;
pub mod reader;
pub mod utils;
pub mod writer;

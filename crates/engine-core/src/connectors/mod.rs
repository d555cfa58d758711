pub mod probe;
pub mod sink;
pub mod source;

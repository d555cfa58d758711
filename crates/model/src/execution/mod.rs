pub mod failure;
pub mod metrics;
pub mod result;

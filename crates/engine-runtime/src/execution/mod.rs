pub mod factory;
pub mod orchestrator;
pub mod scheduler;
pub mod step;

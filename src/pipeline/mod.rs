pub mod orchestrator;
pub mod sink;

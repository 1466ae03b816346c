pub mod catalog;
pub mod discovery;
pub mod enrichment;
pub mod orchestrator;
pub mod profile;
pub mod queries;
pub mod ranking;

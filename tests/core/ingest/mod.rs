//! Ingestion tests
//!
//! Orchestrator runs against an in-memory recording backend.

mod test_failures;
mod test_orchestrator;

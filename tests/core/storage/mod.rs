//! Storage layer tests
//!
//! Full ingestion runs against the Tantivy backend.

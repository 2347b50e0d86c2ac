//! # askdb-core
//!
//! Core types shared across all askdb crates.
//!
//! This crate provides the foundational data model for the routing engine:
//! - The in-memory schema catalog (databases, tables, columns) for one host
//! - The advisory priority set of databases
//! - Training artifacts, history records, and per-kind statistics
//! - Query resolution results produced by the router
//! - Cross-cutting error types

pub mod catalog;
pub mod errors;
pub mod priority;
pub mod resolution;
pub mod training;

pub use catalog::{
    DatabaseEntry, SYSTEM_SCHEMAS, SchemaCatalog, TableEntry, is_system_schema, qualified_name,
    quote_ident,
};
pub use errors::CoreError;
pub use priority::PrioritySet;
pub use resolution::{MatchType, QueryResolution};
pub use training::{RecordMetadata, TrainingArtifact, TrainingKind, TrainingRecord, TrainingStats};

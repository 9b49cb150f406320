//! askql Core - relational store for natural-language questions
//!
//! This crate provides the read-only query engine built on Apache Arrow DataFusion:
//! - Table registration from CSV/Parquet files
//! - Schema description for prompt construction
//! - SQL execution with tabular text rendering

pub mod engine;
pub mod executor;
pub mod schema;
pub mod source;

pub use engine::QueryEngine;
pub use executor::{QueryExecutor, RelationalStore};
pub use source::{SourceError, TableSource};

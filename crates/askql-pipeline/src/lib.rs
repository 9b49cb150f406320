//! askql Pipeline - answers natural-language questions over a tabular dataset
//!
//! The pipeline turns a question into SQL with the language model, cleans and
//! executes it, and rephrases the rows into the final answer. Every request
//! ends in a [`ResponseEnvelope`], success or error.

pub mod config;
pub mod envelope;
pub mod error;
pub mod pipeline;
pub mod service;

pub use config::PipelineConfig;
pub use envelope::{extract_urls, AnswerRecord, ResponseEnvelope, ResponseStatus, UrlEntry};
pub use error::{PipelineError, PipelineStage};
pub use pipeline::{AnswerPipeline, NO_DATA_ANSWER};
pub use service::ServiceState;

//! Pipeline stages and failures.

use std::fmt;

/// Progress of a single question through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Started,
    QueryGenerated,
    QueryCleaned,
    Executed,
    Answered,
    Completed,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Started => "started",
            PipelineStage::QueryGenerated => "query_generated",
            PipelineStage::QueryCleaned => "query_cleaned",
            PipelineStage::Executed => "executed",
            PipelineStage::Answered => "answered",
            PipelineStage::Completed => "completed",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Errors that end a request with the error envelope. None are retried.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The language model could not produce a SQL draft.
    #[error("query generation failed: {0:#}")]
    Generation(anyhow::Error),
    /// The cleaned SQL could not be executed against the store.
    #[error("query execution failed for `{sql}`: {error:#}")]
    Execution { sql: String, error: anyhow::Error },
    /// The language model could not rephrase a valid result.
    #[error("answer rephrasing failed: {0:#}")]
    Rephrase(anyhow::Error),
}

impl PipelineError {
    /// The last stage reached before the failure
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::Generation(_) => PipelineStage::Started,
            PipelineError::Execution { .. } => PipelineStage::QueryCleaned,
            PipelineError::Rephrase(_) => PipelineStage::Executed,
        }
    }
}

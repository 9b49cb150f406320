//! Service startup: builds the pipeline once and records whether it succeeded.

use std::sync::Arc;

use tracing::{error, info};

use askql_ai::LlmClient;
use askql_core::QueryEngine;

use crate::config::PipelineConfig;
use crate::pipeline::AnswerPipeline;

/// Outcome of startup. A failed startup is kept as `Degraded` and is not retried.
#[derive(Clone)]
pub enum ServiceState {
    Ready(Arc<AnswerPipeline>),
    Degraded { reason: String },
}

impl ServiceState {
    /// Load tables, describe the schema, and connect the model client.
    pub async fn initialize(config: &PipelineConfig) -> Self {
        match build_pipeline(config).await {
            Ok(pipeline) => {
                info!("askql pipeline initialized successfully");
                ServiceState::Ready(Arc::new(pipeline))
            }
            Err(e) => {
                error!("System init failed: {:#}", e);
                ServiceState::Degraded {
                    reason: format!("{:#}", e),
                }
            }
        }
    }

    pub fn pipeline(&self) -> Option<&Arc<AnswerPipeline>> {
        match self {
            ServiceState::Ready(pipeline) => Some(pipeline),
            ServiceState::Degraded { .. } => None,
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, ServiceState::Ready(_))
    }
}

async fn build_pipeline(config: &PipelineConfig) -> anyhow::Result<AnswerPipeline> {
    let mut engine = QueryEngine::new(config.sample_rows);
    engine.load_tables(&config.tables).await?;

    let llm = LlmClient::from_env()?;
    info!("Using LLM provider {:?}", llm.provider());

    AnswerPipeline::initialize(Arc::new(engine), Arc::new(llm), config.result_cap).await
}

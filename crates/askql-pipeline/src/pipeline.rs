//! Question answering pipeline: generate, clean, execute, rephrase.

use std::sync::Arc;

use tracing::{debug, error, info, info_span, Instrument};
use uuid::Uuid;

use askql_ai::{AnswerRephraser, GeneratedQuery, LanguageModel, QueryGenerator, TokenCounter};
use askql_core::{QueryExecutor, RelationalStore};

use crate::envelope::ResponseEnvelope;
use crate::error::{PipelineError, PipelineStage};

/// Answer used when the query returns no rows; the model is not consulted.
pub const NO_DATA_ANSWER: &str = "No data available.";

fn reached(stage: PipelineStage) {
    debug!(%stage, "Pipeline stage reached");
}

/// Result of a completed run, before it is wrapped in an envelope
#[derive(Debug, Clone)]
struct Completed {
    query: GeneratedQuery,
    answer: String,
}

/// The question answering service.
///
/// Built once at startup and shared read-only by every request.
#[derive(Clone)]
pub struct AnswerPipeline {
    generator: QueryGenerator,
    executor: QueryExecutor,
    rephraser: AnswerRephraser,
    tokens: TokenCounter,
}

impl AnswerPipeline {
    pub fn new(
        store: Arc<dyn RelationalStore>,
        llm: Arc<dyn LanguageModel>,
        tokens: TokenCounter,
        schema_description: Arc<str>,
        result_cap: usize,
    ) -> Self {
        Self {
            generator: QueryGenerator::new(llm.clone(), schema_description, result_cap),
            executor: QueryExecutor::new(store),
            rephraser: AnswerRephraser::new(llm),
            tokens,
        }
    }

    /// Describe the store's schema and load the token encoding, then build the pipeline.
    pub async fn initialize(
        store: Arc<dyn RelationalStore>,
        llm: Arc<dyn LanguageModel>,
        result_cap: usize,
    ) -> anyhow::Result<Self> {
        let schema_description: Arc<str> = store.describe_schema().await?.into();
        info!(
            "Schema description ready ({} bytes)",
            schema_description.len()
        );
        let tokens = TokenCounter::cl100k()?;
        Ok(Self::new(store, llm, tokens, schema_description, result_cap))
    }

    pub fn schema_description(&self) -> &str {
        self.generator.schema_description()
    }

    /// Answer one question.
    ///
    /// Never fails: any stage error yields the error envelope, which still
    /// reports the token count of the generation prompt.
    pub async fn answer(&self, question: &str) -> ResponseEnvelope {
        let request_id = Uuid::new_v4();
        let span = info_span!("answer", %request_id);

        async {
            info!("Received question: {}", question);
            reached(PipelineStage::Started);

            let prompt = self.generator.prompt_for(question);
            let input_tokens = self.tokens.count(&prompt);
            info!(input_tokens, "Generation prompt built");

            match self.run(question).await {
                Ok(completed) => {
                    let output_tokens = self.tokens.count(&completed.answer);
                    let total_tokens = input_tokens + output_tokens;
                    info!(output_tokens, total_tokens, "Final answer: {}", completed.answer);
                    reached(PipelineStage::Completed);
                    ResponseEnvelope::success(
                        completed.answer,
                        completed.query.cleaned_text,
                        total_tokens,
                    )
                }
                Err(e) => {
                    error!(
                        stage = %e.stage(),
                        "Pipeline failed, answering with error envelope: {}", e
                    );
                    reached(PipelineStage::Failed);
                    ResponseEnvelope::error(input_tokens)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, question: &str) -> Result<Completed, PipelineError> {
        let raw = self
            .generator
            .generate(question)
            .await
            .map_err(PipelineError::Generation)?;
        reached(PipelineStage::QueryGenerated);

        let query = GeneratedQuery::from_raw(raw);
        if !query.is_statement() {
            info!("No SELECT statement isolated, executing draft as-is");
        }
        info!("Generated SQL query: {}", query.cleaned_text);
        reached(PipelineStage::QueryCleaned);

        let result = self
            .executor
            .execute(&query.cleaned_text)
            .await
            .map_err(|error| PipelineError::Execution {
                sql: query.cleaned_text.clone(),
                error,
            })?;
        reached(PipelineStage::Executed);

        let answer = if result.trim().is_empty() {
            NO_DATA_ANSWER.to_string()
        } else {
            self.rephraser
                .rephrase(question, &query.cleaned_text, &result)
                .await
                .map_err(PipelineError::Rephrase)?
        };
        reached(PipelineStage::Answered);

        Ok(Completed { query, answer })
    }
}

//! SQL draft generation

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::client::LanguageModel;
use crate::prompt::build_sql_prompt;

/// Turns questions into SQL drafts using the language model.
///
/// The schema description and result cap are fixed for the generator's
/// lifetime.
#[derive(Clone)]
pub struct QueryGenerator {
    llm: Arc<dyn LanguageModel>,
    schema_description: Arc<str>,
    result_cap: usize,
}

impl QueryGenerator {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        schema_description: Arc<str>,
        result_cap: usize,
    ) -> Self {
        Self {
            llm,
            schema_description,
            result_cap,
        }
    }

    pub fn schema_description(&self) -> &str {
        &self.schema_description
    }

    /// The exact prompt that `generate` sends for `question`
    pub fn prompt_for(&self, question: &str) -> String {
        build_sql_prompt(question, &self.schema_description, self.result_cap)
    }

    /// Ask the model for a SQL draft. The response is returned unmodified.
    pub async fn generate(&self, question: &str) -> Result<String> {
        let prompt = self.prompt_for(question);
        let raw = self.llm.complete(&prompt).await?;
        debug!("Raw SQL draft: {}", raw);
        Ok(raw)
    }
}

//! Rephrasing of query results into the final answer

use std::sync::Arc;

use anyhow::Result;

use crate::client::LanguageModel;
use crate::prompt::build_answer_prompt;

#[derive(Clone)]
pub struct AnswerRephraser {
    llm: Arc<dyn LanguageModel>,
}

impl AnswerRephraser {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Ask the model to present `result` as an answer to `question`.
    /// The response is returned unmodified.
    pub async fn rephrase(&self, question: &str, query: &str, result: &str) -> Result<String> {
        let prompt = build_answer_prompt(question, query, result);
        self.llm.complete(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct CapturingLlm {
        last_prompt: Mutex<Option<String>>,
    }

    #[async_trait]
    impl LanguageModel for CapturingLlm {
        async fn complete(&self, prompt: &str) -> Result<String> {
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            Ok("  Pawan scored 12 raid points.\n".to_string())
        }
    }

    #[tokio::test]
    async fn test_rephrase_builds_prompt_and_keeps_response() {
        let llm = Arc::new(CapturingLlm {
            last_prompt: Mutex::new(None),
        });
        let rephraser = AnswerRephraser::new(llm.clone());

        let answer = rephraser
            .rephrase("pawan points?", "SELECT 12;", "| 12 |")
            .await
            .unwrap();
        assert_eq!(answer, "  Pawan scored 12 raid points.\n");

        let prompt = llm.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("Question: pawan points?"));
        assert!(prompt.contains("SQL Query: SELECT 12;"));
        assert!(prompt.contains("SQL Result: | 12 |"));
    }
}

//! LLM API client for query generation and answer rephrasing

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// A hosted language model prompted with a single text and answering with text.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// LLM provider configuration
#[derive(Clone)]
pub enum LlmProvider {
    Gemini {
        api_key: String,
        model: String,
        base_url: String,
    },
    OpenAI {
        api_key: String,
        model: String,
        base_url: String,
    },
    Anthropic {
        api_key: String,
        model: String,
    },
}

impl fmt::Debug for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmProvider::Gemini {
                model, base_url, ..
            } => f
                .debug_struct("Gemini")
                .field("model", model)
                .field("base_url", base_url)
                .finish_non_exhaustive(),
            LlmProvider::OpenAI {
                model, base_url, ..
            } => f
                .debug_struct("OpenAI")
                .field("model", model)
                .field("base_url", base_url)
                .finish_non_exhaustive(),
            LlmProvider::Anthropic { model, .. } => f
                .debug_struct("Anthropic")
                .field("model", model)
                .finish_non_exhaustive(),
        }
    }
}

/// LLM client. Requests are sent with temperature 0.
#[derive(Debug)]
pub struct LlmClient {
    provider: LlmProvider,
    client: reqwest::Client,
}

impl LlmClient {
    pub fn new(provider: LlmProvider) -> Self {
        Self {
            provider,
            client: reqwest::Client::new(),
        }
    }

    /// Create a client from environment variables.
    ///
    /// API keys are only ever read from the environment.
    pub fn from_env() -> Result<Self> {
        // Gemini first, then OpenAI, then Anthropic
        if let Ok(api_key) = std::env::var("GEMINI_API_KEY") {
            let model =
                std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string());
            let base_url = std::env::var("GEMINI_API_BASE")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());
            Ok(Self::new(LlmProvider::Gemini {
                api_key,
                model,
                base_url,
            }))
        } else if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
            let base_url = std::env::var("OPENAI_API_BASE")
                .unwrap_or_else(|_| "https://api.openai.com".to_string());
            Ok(Self::new(LlmProvider::OpenAI {
                api_key,
                model,
                base_url,
            }))
        } else if let Ok(api_key) = std::env::var("ANTHROPIC_API_KEY") {
            let model = std::env::var("ANTHROPIC_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-20250514".to_string());
            Ok(Self::new(LlmProvider::Anthropic { api_key, model }))
        } else {
            anyhow::bail!(
                "No LLM API key found. Set GEMINI_API_KEY, OPENAI_API_KEY or ANTHROPIC_API_KEY"
            )
        }
    }

    pub fn provider(&self) -> &LlmProvider {
        &self.provider
    }

    async fn call_gemini(
        &self,
        api_key: &str,
        model: &str,
        base_url: &str,
        prompt: &str,
    ) -> Result<String> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GeminiRequest {
            contents: Vec<GeminiContent>,
            generation_config: GenerationConfig,
        }

        #[derive(Serialize, Deserialize)]
        struct GeminiContent {
            #[serde(default)]
            role: Option<String>,
            #[serde(default)]
            parts: Vec<GeminiPart>,
        }

        #[derive(Serialize, Deserialize)]
        struct GeminiPart {
            #[serde(default)]
            text: String,
        }

        #[derive(Serialize)]
        struct GenerationConfig {
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct GeminiResponse {
            #[serde(default)]
            candidates: Vec<GeminiCandidate>,
        }

        #[derive(Deserialize)]
        struct GeminiCandidate {
            content: GeminiContent,
        }

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig { temperature: 0.0 },
        };

        debug!("Calling Gemini API at {} with model: {}", base_url, model);

        let response = self
            .client
            .post(format!("{}/v1beta/models/{}:generateContent", base_url, model))
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            anyhow::bail!("Gemini API error ({}): {}", status, body);
        }

        let response: GeminiResponse = response.json().await?;
        let content = response
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<String>()
            })
            .ok_or_else(|| anyhow::anyhow!("No response from Gemini"))?;

        info!("Received response from Gemini");
        Ok(content)
    }

    async fn call_openai(
        &self,
        api_key: &str,
        model: &str,
        base_url: &str,
        prompt: &str,
    ) -> Result<String> {
        #[derive(Serialize)]
        struct OpenAIRequest {
            model: String,
            messages: Vec<OpenAIMessage>,
            temperature: f32,
        }

        #[derive(Serialize)]
        struct OpenAIMessage {
            role: String,
            content: String,
        }

        #[derive(Deserialize)]
        struct OpenAIResponse {
            choices: Vec<OpenAIChoice>,
        }

        #[derive(Deserialize)]
        struct OpenAIChoice {
            message: OpenAIMessageContent,
        }

        #[derive(Deserialize)]
        struct OpenAIMessageContent {
            content: String,
        }

        let request = OpenAIRequest {
            model: model.to_string(),
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: 0.0,
        };

        debug!(
            "Calling OpenAI-compatible API at {} with model: {}",
            base_url, model
        );

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            anyhow::bail!("OpenAI API error ({}): {}", status, body);
        }

        let response: OpenAIResponse = response.json().await?;
        let content = response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("No response from OpenAI"))?;

        info!("Received response from OpenAI");
        Ok(content)
    }

    async fn call_anthropic(&self, api_key: &str, model: &str, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct AnthropicRequest {
            model: String,
            max_tokens: u32,
            temperature: f32,
            messages: Vec<AnthropicMessage>,
        }

        #[derive(Serialize)]
        struct AnthropicMessage {
            role: String,
            content: String,
        }

        #[derive(Deserialize)]
        struct AnthropicResponse {
            content: Vec<AnthropicContent>,
        }

        #[derive(Deserialize)]
        struct AnthropicContent {
            text: String,
        }

        let request = AnthropicRequest {
            model: model.to_string(),
            max_tokens: 4096,
            temperature: 0.0,
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        debug!("Calling Anthropic API with model: {}", model);

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await?;
            anyhow::bail!("Anthropic API error ({}): {}", status, body);
        }

        let response: AnthropicResponse = response.json().await?;
        let content = response
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| anyhow::anyhow!("No response from Anthropic"))?;

        info!("Received response from Anthropic");
        Ok(content)
    }
}

#[async_trait]
impl LanguageModel for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        match &self.provider {
            LlmProvider::Gemini {
                api_key,
                model,
                base_url,
            } => self.call_gemini(api_key, model, base_url, prompt).await,
            LlmProvider::OpenAI {
                api_key,
                model,
                base_url,
            } => self.call_openai(api_key, model, base_url, prompt).await,
            LlmProvider::Anthropic { api_key, model } => {
                self.call_anthropic(api_key, model, prompt).await
            }
        }
    }
}

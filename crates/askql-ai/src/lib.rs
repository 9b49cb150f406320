//! askql AI - LLM integration for natural language questions over SQL
//!
//! This crate provides:
//! - LLM API client (Gemini/OpenAI/Anthropic) behind the `LanguageModel` trait
//! - Prompt building for SQL generation and answer rephrasing
//! - SQL extraction from raw model output
//! - Token accounting

pub mod client;
pub mod extract;
pub mod generator;
pub mod prompt;
pub mod rephraser;
pub mod tokens;

pub use client::{LanguageModel, LlmClient, LlmProvider};
pub use extract::{extract_sql, GeneratedQuery};
pub use generator::QueryGenerator;
pub use rephraser::AnswerRephraser;
pub use tokens::TokenCounter;

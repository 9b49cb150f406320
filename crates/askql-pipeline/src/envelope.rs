//! Response envelope returned for every question.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Absolute http(s) link, ending at whitespace or a pipe (table cell border).
static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s|]+").expect("url pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlEntry {
    pub url: String,
}

/// The answer to one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub answer: String,
    pub query: String,
    pub tokens_used: usize,
    #[serde(default)]
    pub raw_results: Vec<UrlEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub status: ResponseStatus,
    pub data: AnswerRecord,
    pub timestamp: String,
}

impl ResponseEnvelope {
    pub fn success(answer: String, query: String, tokens_used: usize) -> Self {
        let raw_results = extract_urls(&answer);
        Self {
            status: ResponseStatus::Success,
            data: AnswerRecord {
                answer,
                query,
                tokens_used,
                raw_results,
            },
            timestamp: now_iso8601(),
        }
    }

    /// Error envelope: only the input prompt is accounted for.
    pub fn error(input_tokens: usize) -> Self {
        Self {
            status: ResponseStatus::Error,
            data: AnswerRecord {
                answer: String::new(),
                query: String::new(),
                tokens_used: input_tokens,
                raw_results: Vec::new(),
            },
            timestamp: now_iso8601(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

/// Collect every absolute URL in `text`, in order of appearance.
pub fn extract_urls(text: &str) -> Vec<UrlEntry> {
    URL_PATTERN
        .find_iter(text)
        .map(|m| UrlEntry {
            url: m.as_str().to_string(),
        })
        .collect()
}

pub(crate) fn now_iso8601() -> String {
    Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_urls_pipe_terminated() {
        let urls = extract_urls("See https://example.com/a|other text");
        assert_eq!(
            urls,
            vec![UrlEntry {
                url: "https://example.com/a".to_string()
            }]
        );
    }

    #[test]
    fn test_extract_urls_from_table() {
        let answer = "| player | profile |\n|---|---|\n| Pawan | http://kb.example/p/1 |\n| Naveen |https://kb.example/p/2|";
        let urls: Vec<String> = extract_urls(answer).into_iter().map(|u| u.url).collect();
        assert_eq!(urls, vec!["http://kb.example/p/1", "https://kb.example/p/2"]);
    }

    #[test]
    fn test_extract_urls_none() {
        assert!(extract_urls("No data available.").is_empty());
        assert!(extract_urls("ftp://example.com and www.example.com").is_empty());
    }

    #[test]
    fn test_success_envelope_serialization() {
        let envelope = ResponseEnvelope::success(
            "Profile: https://example.com/a".to_string(),
            "SELECT 1;".to_string(),
            42,
        );
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"]["answer"], "Profile: https://example.com/a");
        assert_eq!(json["data"]["query"], "SELECT 1;");
        assert_eq!(json["data"]["tokens_used"], 42);
        assert_eq!(json["data"]["raw_results"][0]["url"], "https://example.com/a");
        assert!(chrono::DateTime::parse_from_rfc3339(json["timestamp"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_error_envelope_shape() {
        let envelope = ResponseEnvelope::error(17);
        assert!(!envelope.is_success());

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["data"]["answer"], "");
        assert_eq!(json["data"]["query"], "");
        assert_eq!(json["data"]["tokens_used"], 17);
        assert_eq!(json["data"]["raw_results"], serde_json::json!([]));
    }

    #[test]
    fn test_answer_record_deserializes_without_raw_results() {
        let json = r#"{"answer":"a","query":"q","tokens_used":3}"#;
        let record: AnswerRecord = serde_json::from_str(json).unwrap();
        assert!(record.raw_results.is_empty());
    }
}

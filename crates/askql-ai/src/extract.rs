//! SQL extraction from raw language-model output
//!
//! This is lexical cleanup only. Nothing here parses or validates SQL; a
//! response without a recognizable statement is passed on best-effort and
//! surfaces later as an execution error.

use once_cell::sync::Lazy;
use regex::Regex;

/// Fenced code block, optionally tagged with a SQL dialect.
static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:SQLQuery|sql|SQL|mysql|postgresql)?\s*(.*?)\s*```")
        .expect("fenced block pattern is valid")
});

/// Leading label such as `SQLQuery:` or `PostgreSQL:`.
static LEADING_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:SQL\s*Query|SQLQuery|MySQL|PostgreSQL|SQL)\s*:\s*")
        .expect("label pattern is valid")
});

/// First `SELECT ... ;` statement, across lines.
static SELECT_STATEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)SELECT.*?;").expect("select pattern is valid"));

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Reduce raw model output to a single SQL statement on one line.
///
/// Steps, each applied to the previous output: unwrap fenced blocks, drop a
/// leading label, narrow to the first `SELECT ... ;` if there is one, then
/// trim and collapse whitespace. Never fails.
pub fn extract_sql(text: &str) -> String {
    let unfenced = FENCED_BLOCK.replace_all(text, "${1}");
    let unlabeled = LEADING_LABEL.replace(&unfenced, "");

    let statement = match SELECT_STATEMENT.find(&unlabeled) {
        Some(m) => m.as_str(),
        None => &*unlabeled,
    };

    WHITESPACE.replace_all(statement.trim(), " ").into_owned()
}

/// A SQL draft as returned by the model, alongside its cleaned form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedQuery {
    pub raw_text: String,
    pub cleaned_text: String,
}

impl GeneratedQuery {
    pub fn from_raw(raw_text: String) -> Self {
        let cleaned_text = extract_sql(&raw_text);
        Self {
            raw_text,
            cleaned_text,
        }
    }

    /// Whether a `SELECT ... ;` statement could be isolated from the draft
    pub fn is_statement(&self) -> bool {
        let upper = self.cleaned_text.to_ascii_uppercase();
        upper.starts_with("SELECT") && upper.ends_with(';')
    }
}

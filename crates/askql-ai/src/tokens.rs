//! Token accounting for usage reporting

use std::sync::Arc;

use tiktoken_rs::CoreBPE;

/// Counts tokens with the `cl100k_base` encoding.
///
/// The encoding is loaded once; clones share it.
#[derive(Clone)]
pub struct TokenCounter {
    bpe: Arc<CoreBPE>,
}

impl TokenCounter {
    pub fn cl100k() -> anyhow::Result<Self> {
        let bpe = tiktoken_rs::cl100k_base()?;
        Ok(Self { bpe: Arc::new(bpe) })
    }

    /// Number of tokens in `text`. Special-token markup is counted as plain text.
    pub fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.bpe.encode_ordinary(text).len()
    }
}

impl std::fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCounter")
            .field("encoding", &"cl100k_base")
            .finish()
    }
}

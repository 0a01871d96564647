//! LLM summarization of digest entries.

mod gemini;
mod prompt;

pub use gemini::{GeminiSummarizer, FALLBACK_MODELS};
pub use prompt::build_prompt;

use async_trait::async_trait;

use crate::error::Result;
use crate::feed::FeedEntry;

/// Turns the selected entries into the digest's summary section.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, entries: &[FeedEntry]) -> Result<String>;
}

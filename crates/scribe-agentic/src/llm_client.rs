//! LLM Client Trait
//!
//! Provider-neutral chat interface used by every workflow step.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

/// Chat-completion client
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Call the LLM with system + user prompts, return raw text response
    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;

    /// Get the model name for logging
    fn model_name(&self) -> &str;

    /// Get the provider name for logging
    fn provider_name(&self) -> &str;
}

/// Shared client handle, built once and reused by every workflow step
pub type SharedLlmClient = Arc<dyn LlmClient>;

/// Truncate model output for log lines without splitting a UTF-8 sequence
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

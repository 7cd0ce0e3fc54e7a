//! Client Factory
//!
//! Builds the chat client behind the shared trait object.

use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::llm_client::SharedLlmClient;
use crate::openai_client::OpenAiClient;

/// Create a chat client for `api_key`
///
/// `model` overrides the provider default.
pub fn create_llm_client(api_key: String, model: Option<&str>) -> Result<SharedLlmClient> {
    if api_key.trim().is_empty() {
        return Err(anyhow!("OpenAI API key is empty"));
    }

    let client: SharedLlmClient = match model {
        Some(model) => Arc::new(OpenAiClient::with_model(api_key, model)),
        None => Arc::new(OpenAiClient::new(api_key)),
    };

    tracing::info!(
        provider = client.provider_name(),
        model = client.model_name(),
        "LLM client created"
    );
    Ok(client)
}

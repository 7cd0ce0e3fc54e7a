//! LLM client layer for Sprint Scribe
//!
//! Chat-completion clients used by the query-resolution workflow for query
//! paraphrasing, relevance judgment and proposal synthesis. The crate knows
//! nothing about tickets or epics; it only turns prompts into text.
//!
//! The only backend is OpenAI chat completions (`gpt-4o-mini` unless a model
//! is given). Callers hold it as a [`SharedLlmClient`], so tests substitute
//! scripted fakes.

pub mod client_factory;
pub mod llm_client;
pub mod openai_client;

pub use client_factory::create_llm_client;
pub use llm_client::{preview, LlmClient, SharedLlmClient};
pub use openai_client::OpenAiClient;

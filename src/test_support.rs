//! Fakes shared by unit tests

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use scribe_agentic::LlmClient;

/// LLM that replays canned responses in order and records every prompt
pub struct ScriptedLlm {
    responses: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedLlm {
    pub fn new<'a>(responses: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(|r| Ok(r.to_string())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from(vec![Err(message.to_string())])),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// (system, user) prompt pairs in call order
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        self.prompts
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));

        let mut responses = self.responses.lock().unwrap();
        let next = match responses.pop_front() {
            Some(Ok(text)) => Ok(text),
            // failures repeat
            Some(Err(msg)) => {
                responses.push_front(Err(msg.clone()));
                Err(msg)
            }
            None => Err("script exhausted".to_string()),
        };
        next.map_err(|msg| anyhow!(msg))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }

    fn provider_name(&self) -> &str {
        "test"
    }
}

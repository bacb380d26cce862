//! OpenAI Chat Completions adapter

use async_trait::async_trait;
use colloquy_application::{GenerationError, TextGenerator};
use colloquy_domain::{Message, ParticipantId};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::role_str;

/// OpenAI Chat Completions API provider.
pub struct OpenAiGenerator {
    participant: ParticipantId,
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(participant: ParticipantId, api_key: impl Into<String>) -> Self {
        Self {
            participant,
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn error(&self, cause: impl Into<String>) -> GenerationError {
        GenerationError::new(self.participant.clone(), cause)
    }
}

/// Build a Chat Completions request body.
///
/// Pure conversion helper: no I/O. Roles pass through unchanged; the
/// Chat Completions API accepts the system entry inline.
pub fn build_openai_request(context: &[Message], model: &str, max_tokens: u32) -> Value {
    let messages: Vec<Value> = context
        .iter()
        .map(|m| json!({"role": role_str(m.role), "content": m.content}))
        .collect();

    json!({
        "model": model,
        "messages": messages,
        "max_tokens": max_tokens,
        "temperature": 0.7,
    })
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(
        &self,
        context: &[Message],
        max_tokens: u32,
    ) -> Result<String, GenerationError> {
        let body = build_openai_request(context, &self.model, max_tokens);
        debug!("Requesting completion from {} ({})", self.model, self.participant);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.error(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(self.error(format!("HTTP {}: {}", status, text)));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| self.error(format!("invalid response body: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| self.error("response contained no choices"))?;

        Ok(content.trim().to_string())
    }
}

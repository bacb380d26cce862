//! Anthropic Messages adapter

use async_trait::async_trait;
use colloquy_application::{GenerationError, TextGenerator};
use colloquy_domain::{Message, ParticipantId, Role};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::role_str;

/// Anthropic Messages API provider.
pub struct AnthropicGenerator {
    participant: ParticipantId,
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    api_version: String,
}

impl AnthropicGenerator {
    pub fn new(participant: ParticipantId, api_key: impl Into<String>) -> Self {
        Self {
            participant,
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.anthropic.com/v1".to_string(),
            model: "claude-3-5-sonnet-20241022".to_string(),
            api_version: "2023-06-01".to_string(),
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

/// Build a Messages API request body.
///
/// Pure conversion helper: no I/O. The Messages API takes the system
/// instruction as a top-level field, so system entries are extracted from
/// the context and the remaining messages pass through.
pub fn build_anthropic_request(context: &[Message], model: &str, max_tokens: u32) -> Value {
    let mut system_parts: Vec<&str> = Vec::new();
    let mut messages: Vec<Value> = Vec::new();

    for m in context {
        match m.role {
            Role::System => system_parts.push(m.content.as_str()),
            Role::User | Role::Assistant => {
                messages.push(json!({"role": role_str(m.role), "content": m.content}));
            }
        }
    }

    let mut body = json!({
        "model": model,
        "max_tokens": max_tokens,
        "messages": messages,
        "temperature": 0.7,
    });

    if !system_parts.is_empty() {
        body["system"] = json!(system_parts.join("\n\n"));
    }

    body
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl TextGenerator for AnthropicGenerator {
    async fn generate(
        &self,
        context: &[Message],
        max_tokens: u32,
    ) -> Result<String, GenerationError> {
        let body = build_anthropic_request(context, &self.model, max_tokens);
        debug!("Requesting completion from {} ({})", self.model, self.participant);

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.error(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(self.error(format!("HTTP {}: {}", status, text)));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| self.error(format!("invalid response body: {}", e)))?;

        let content = parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| self.error("response contained no text content"))?;

        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_entry_extracted_to_top_level() {
        let context = vec![
            Message::system("topic etiquette"),
            Message::assistant("first"),
            Message::user("second"),
        ];

        let body = build_anthropic_request(&context, "claude-3-5-sonnet-20241022", 800);

        assert_eq!(body["system"], "topic etiquette");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "assistant");
        assert_eq!(messages[1]["role"], "user");
    }

    #[test]
    fn test_no_system_field_without_system_entry() {
        let context = vec![Message::user("just a question")];

        let body = build_anthropic_request(&context, "claude-3-5-sonnet-20241022", 800);

        assert!(body.get("system").is_none());
    }
}

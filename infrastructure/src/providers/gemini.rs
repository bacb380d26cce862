//! Google Gemini adapter

use async_trait::async_trait;
use colloquy_application::{GenerationError, TextGenerator};
use colloquy_domain::{Message, ParticipantId, Role};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

/// Google Gemini generateContent API provider.
pub struct GeminiGenerator {
    participant: ParticipantId,
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiGenerator {
    pub fn new(participant: ParticipantId, api_key: impl Into<String>) -> Self {
        Self {
            participant,
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash-exp".to_string(),
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

/// Flatten a role-tagged context into a single labeled prompt.
///
/// Gemini's generateContent endpoint works best here with one combined
/// prompt; each entry keeps a role label and the prompt ends with a cue
/// for the model's own reply.
pub fn flatten_context(context: &[Message]) -> String {
    let mut prompt = String::new();
    for m in context {
        let label = match m.role {
            Role::System => "System",
            Role::User => "User",
            Role::Assistant => "Assistant",
        };
        prompt.push_str(label);
        prompt.push_str(": ");
        prompt.push_str(&m.content);
        prompt.push_str("\n\n");
    }
    prompt.push_str("Your response:");
    prompt
}

/// Build a generateContent request body. Pure conversion helper: no I/O.
pub fn build_gemini_request(context: &[Message], max_tokens: u32) -> Value {
    json!({
        "contents": [{
            "parts": [{"text": flatten_context(context)}]
        }],
        "generationConfig": {
            "maxOutputTokens": max_tokens,
            "temperature": 0.7,
        }
    })
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(
        &self,
        context: &[Message],
        max_tokens: u32,
    ) -> Result<String, GenerationError> {
        let body = build_gemini_request(context, max_tokens);
        debug!("Requesting completion from {} ({})", self.model, self.participant);

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.error(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(self.error(format!("HTTP {}: {}", status, text)));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| self.error(format!("invalid response body: {}", e)))?;

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| self.error("response contained no candidates"))?;

        let text: String = candidate
            .content
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(self.error("candidate contained no text"));
        }

        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_labels_every_entry() {
        let context = vec![
            Message::system("rules"),
            Message::assistant("opening"),
            Message::user("reply"),
        ];

        let prompt = flatten_context(&context);

        assert!(prompt.contains("System: rules"));
        assert!(prompt.contains("Assistant: opening"));
        assert!(prompt.contains("User: reply"));
        assert!(prompt.ends_with("Your response:"));
    }

    #[test]
    fn test_request_carries_generation_config() {
        let body = build_gemini_request(&[Message::user("hello")], 1000);

        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1000);
        assert!(
            body["contents"][0]["parts"][0]["text"]
                .as_str()
                .unwrap()
                .contains("User: hello")
        );
    }
}

//! HTTP client for the upstream OpenAI-compatible chat-completions gateway.
//!
//! One non-streaming completion per call. No retries: a failed call is
//! reported to the relay, which reports it to the workspace.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};

use crate::config::Config;
use crate::error::GatewayError;
use crate::prompts::build_system_prompt;
use crate::relay::protocol::Message;

// === Types ===

/// Client for the inference gateway.
#[must_use]
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

// === GatewayClient ===

impl GatewayClient {
    /// Create a gateway client from configuration.
    ///
    /// A missing credential is accepted here and rejected per request.
    pub fn new(config: &Config) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let client = Self {
            http_client,
            base_url: config.gateway_url(),
            api_key: config.api_key(),
            model: config.model(),
            temperature: config.temperature(),
            max_tokens: config.max_tokens(),
        };
        tracing::info!(
            base_url = %client.base_url,
            model = %client.model,
            credential = client.api_key.is_some(),
            "gateway client ready"
        );
        Ok(client)
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Request a completion for `messages` with the file tree in the system prompt.
    pub async fn complete(
        &self,
        messages: &[Message],
        file_tree: &str,
    ) -> Result<String, GatewayError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GatewayError::MissingCredential)?;

        let body = self.build_body(messages, file_tree);
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), body = %response_text, "AI API error");
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                body: response_text,
            });
        }

        let value: Value = serde_json::from_str(&response_text)
            .map_err(|err| GatewayError::MalformedResponse(err.to_string()))?;
        parse_completion_text(&value)
    }

    fn build_body(&self, messages: &[Message], file_tree: &str) -> Value {
        let mut chat = Vec::with_capacity(messages.len() + 1);
        chat.push(json!({
            "role": "system",
            "content": build_system_prompt(file_tree),
        }));
        chat.extend(messages.iter().map(|message| json!(message)));
        json!({
            "model": self.model,
            "messages": chat,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        })
    }
}

/// Extract the text of the first choice of a chat-completions payload.
fn parse_completion_text(payload: &Value) -> Result<String, GatewayError> {
    let choice = payload
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .ok_or_else(|| GatewayError::MalformedResponse("response missing choices".into()))?;
    choice
        .get("message")
        .and_then(|message| message.get("content"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| GatewayError::MalformedResponse("first choice missing content".into()))
}

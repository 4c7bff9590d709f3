//! OpenAI-compatible chat-completions backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use cf_core::traits::NoteAssistant;
use errors::AssistError;

use crate::prompts::{SUMMARY_SYSTEM_PROMPT, TITLE_SYSTEM_PROMPT};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

pub struct OpenAiAssistant {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiAssistant {
    pub fn new(config: OpenAiConfig) -> Result<Self, AssistError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AssistError::Request {
                reason: e.to_string(),
            })?;
        Ok(Self { http, config })
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, AssistError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        tracing::debug!(model = %self.config.model, chars = user.len(), "chat completion");
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AssistError::Request {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistError::Request {
                reason: format!("chat completion returned {status}: {body}"),
            });
        }

        let parsed: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| AssistError::Malformed {
                    reason: e.to_string(),
                })?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        let content = content.trim();
        if content.is_empty() {
            return Err(AssistError::EmptyResponse);
        }
        Ok(content.to_string())
    }
}

#[async_trait]
impl NoteAssistant for OpenAiAssistant {
    type Error = AssistError;

    async fn generate_title(&self, content: &str) -> Result<String, Self::Error> {
        self.complete(TITLE_SYSTEM_PROMPT, content).await
    }

    async fn summarize(&self, content: &str) -> Result<String, Self::Error> {
        self.complete(SUMMARY_SYSTEM_PROMPT, content).await
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn assistant_for(server: &MockServer) -> OpenAiAssistant {
        OpenAiAssistant::new(
            OpenAiConfig::new("test-key", "gpt-4o-mini").with_base_url(server.uri()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn title_request_carries_model_and_user_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "messages": [
                    { "role": "system" },
                    { "role": "user", "content": "milk, eggs, flour" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [
                    { "message": { "role": "assistant", "content": "  Grocery run plan  " } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let title = assistant_for(&server)
            .generate_title("milk, eggs, flour")
            .await
            .unwrap();
        assert_eq!(title, "Grocery run plan");
    }

    #[tokio::test]
    async fn empty_model_output_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "" } }]
            })))
            .mount(&server)
            .await;

        let err = assistant_for(&server).summarize("body").await.unwrap_err();
        assert!(matches!(err, AssistError::EmptyResponse));
    }

    #[tokio::test]
    async fn http_failure_is_a_request_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let err = assistant_for(&server)
            .generate_title("body")
            .await
            .unwrap_err();
        assert!(matches!(err, AssistError::Request { .. }));
    }
}

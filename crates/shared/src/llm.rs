use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Opaque text-completion capability: one prompt in, one completion out
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;

    fn model_name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
}

pub fn build_model(
    provider: Provider,
    model_name: &str,
    config: &Config,
) -> Result<Box<dyn CompletionModel>> {
    let model: Box<dyn CompletionModel> = match provider {
        Provider::OpenAi => Box::new(OpenAiChat::new(
            config.openai_api_key()?.to_string(),
            model_name.to_string(),
            config.openai_base_url.clone(),
        )?),
        Provider::Anthropic => Box::new(AnthropicChat::new(
            config.anthropic_api_key()?.to_string(),
            model_name.to_string(),
            config.anthropic_base_url.clone(),
        )?),
    };
    Ok(model)
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

fn user_message(prompt: &str) -> Vec<Message> {
    vec![Message {
        role: "user".to_string(),
        content: prompt.to_string(),
    }]
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

/// OpenAI-compatible chat completions endpoint
pub struct OpenAiChat {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiChat {
    pub fn new(api_key: String, model: String, base_url: String) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CompletionModel for OpenAiChat {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            temperature: 0.7,
            messages: user_message(prompt),
        };

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "requesting chat completion");

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to OpenAI API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("OpenAI API error: {} - {}", status, error_text);
        }

        let chat_response = response
            .json::<ChatResponse>()
            .await
            .context("Failed to parse OpenAI API response")?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .context("OpenAI API returned no choices")
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<Content>,
}

#[derive(Deserialize)]
struct Content {
    text: String,
}

/// Anthropic Messages API
pub struct AnthropicChat {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl AnthropicChat {
    pub fn new(api_key: String, model: String, base_url: String) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CompletionModel for AnthropicChat {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ClaudeRequest {
            model: self.model.clone(),
            max_tokens: 4096,
            messages: user_message(prompt),
        };

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "requesting Claude message");

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Claude API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("Claude API error: {} - {}", status, error_text);
        }

        let claude_response = response
            .json::<ClaudeResponse>()
            .await
            .context("Failed to parse Claude API response")?;

        claude_response
            .content
            .into_iter()
            .next()
            .map(|c| c.text)
            .context("Claude API returned no content")
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_openai_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(json!({
                "model": "gpt-3.5-turbo",
                "messages": [{"role": "user", "content": "hello"}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "choices": [{"message": {"role": "assistant", "content": "- 要約"}}]
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let model = OpenAiChat::new(
            "sk-test".to_string(),
            DEFAULT_MODEL.to_string(),
            server.url(),
        )
        .unwrap();
        let completion = model.complete("hello").await.unwrap();

        mock.assert_async().await;
        assert_eq!(completion, "- 要約");
        assert_eq!(model.model_name(), "gpt-3.5-turbo");
    }

    #[tokio::test]
    async fn test_openai_error_status_fails() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body(r#"{"error":{"type":"rate_limit"}}"#)
            .create_async()
            .await;

        let model = OpenAiChat::new("k".to_string(), "m".to_string(), server.url()).unwrap();
        let err = model.complete("hello").await.unwrap_err();
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn test_openai_empty_choices_fails() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let model = OpenAiChat::new("k".to_string(), "m".to_string(), server.url()).unwrap();
        assert!(model.complete("hello").await.is_err());
    }

    #[tokio::test]
    async fn test_anthropic_returns_first_content_block() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "sk-ant")
            .match_header("anthropic-version", "2023-06-01")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"content": [{"type": "text", "text": "summary"}]}).to_string())
            .expect(1)
            .create_async()
            .await;

        let model = AnthropicChat::new(
            "sk-ant".to_string(),
            "claude-3-5-haiku-20241022".to_string(),
            server.url(),
        )
        .unwrap();

        assert_eq!(model.complete("prompt").await.unwrap(), "summary");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_anthropic_error_reports_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(529)
            .with_body(r#"{"type":"error","error":{"type":"overloaded_error"}}"#)
            .create_async()
            .await;

        let model = AnthropicChat::new("k".to_string(), "m".to_string(), server.url()).unwrap();
        let err = model.complete("prompt").await.unwrap_err().to_string();
        assert!(err.contains("529"));
        assert!(err.contains("overloaded_error"));
    }

    #[test]
    fn test_build_model_requires_key() {
        let config = Config::default();
        assert!(build_model(Provider::OpenAi, DEFAULT_MODEL, &config).is_err());

        let config = Config {
            openai_api_key: Some("sk".to_string()),
            ..Config::default()
        };
        let model = build_model(Provider::OpenAi, "gpt-4o-mini", &config).unwrap();
        assert_eq!(model.model_name(), "gpt-4o-mini");
    }
}

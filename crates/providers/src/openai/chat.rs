//! OpenAI 兼容 Chat Completion（OpenAI、DeepSeek、Ollama 等）

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::common::{build_client, error_body};
use crate::config::ProviderConfig;
use crate::error::LlmError;
use crate::traits::ChatProvider;

pub struct OpenaiChatProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl OpenaiChatProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, LlmError> {
        let client = build_client(config.timeout)?;

        tracing::info!(
            "Created OpenaiChatProvider: model={}, base_url={}",
            config.model,
            config.base_url
        );

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ChatProvider for OpenaiChatProvider {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: 0.7,
        };

        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(LlmError::transport)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = error_body(response).await;
            tracing::error!("LLM API error ({}): {}", status, body);
            return Err(LlmError::Status { status, body });
        }

        let body = response.text().await.map_err(LlmError::transport)?;
        let chat_response: ChatResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(LlmError::EmptyChoices)?;

        if content.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }

        Ok(content)
    }
}

pub fn create(config: &ProviderConfig) -> Result<Box<dyn ChatProvider>, LlmError> {
    Ok(Box::new(OpenaiChatProvider::new(config)?))
}

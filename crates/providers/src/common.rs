//! 共享工具和 OpenAI 兼容格式实现

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::ProviderConfig;
use crate::error::EmbeddingError;
use crate::traits::EmbedProvider;

/// 文本规范化：去掉首尾空白，连续空白合并为单个空格
pub(crate) fn normalize_for_embedding(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 构建带超时的 HTTP 客户端
pub(crate) fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder().timeout(timeout).build()
}

/// 读取错误响应体（读取失败时返回空字符串）
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    response.text().await.unwrap_or_default()
}

/// 校验批量 embedding 的数量和维度
pub(crate) fn check_batch(
    expected: usize,
    dimension: usize,
    embeddings: Vec<Vec<f32>>,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if embeddings.len() != expected {
        return Err(EmbeddingError::CountMismatch {
            expected,
            actual: embeddings.len(),
        });
    }

    if let Some(bad) = embeddings.iter().find(|v| v.len() != dimension) {
        return Err(EmbeddingError::DimensionMismatch {
            expected: dimension,
            actual: bad.len(),
        });
    }

    Ok(embeddings)
}

/// OpenAI 兼容格式 Embed（OpenAI、Ollama 等）
pub struct OpenaiCompatibleEmbed {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct OpenaiEmbedRequest {
    model: String,
    input: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct OpenaiEmbedResponse {
    data: Vec<OpenaiEmbedData>,
}

#[derive(Debug, Deserialize)]
struct OpenaiEmbedData {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

impl OpenaiCompatibleEmbed {
    pub fn new(config: &ProviderConfig, dimension: usize) -> Result<Self, EmbeddingError> {
        let client = build_client(config.timeout)?;

        tracing::info!(
            "Created OpenaiCompatibleEmbed: model={}, dimension={}, base_url={}",
            config.model,
            dimension,
            config.base_url
        );

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            dimension,
        })
    }
}

#[async_trait]
impl EmbedProvider for OpenaiCompatibleEmbed {
    async fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let request = OpenaiEmbedRequest {
            model: self.model.clone(),
            input: texts.iter().map(|t| normalize_for_embedding(t)).collect(),
            dimensions: Some(self.dimension),
        };

        let url = format!("{}/embeddings", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(EmbeddingError::transport)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = error_body(response).await;
            tracing::error!("Embed API error ({}): {}", status, body);
            return Err(EmbeddingError::Status { status, body });
        }

        let body = response.text().await.map_err(EmbeddingError::transport)?;
        let mut embed_response: OpenaiEmbedResponse = serde_json::from_str(&body)
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        // data 按 index 排序，保证与输入顺序一致
        embed_response
            .data
            .sort_by_key(|d| d.index.unwrap_or(usize::MAX));

        let embeddings = embed_response
            .data
            .into_iter()
            .map(|d| d.embedding)
            .collect();

        check_batch(texts.len(), self.dimension, embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model(&self) -> &str {
        &self.model
    }
}

//! 本地批量 Embedding 服务
//!
//! `POST {base_url}/embed`，请求体 `{"texts": [...]}`，
//! 响应体 `{"embeddings": [[...], ...]}`，与输入一一对应。

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::common::{build_client, check_batch, error_body, normalize_for_embedding};
use crate::config::ProviderConfig;
use crate::error::EmbeddingError;
use crate::traits::EmbedProvider;

pub struct TextsEmbedProvider {
    client: Client,
    model: String,
    base_url: String,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct TextsEmbedRequest<'a> {
    texts: &'a [String],
}

#[derive(Debug, Deserialize)]
struct TextsEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl TextsEmbedProvider {
    pub fn new(config: &ProviderConfig, dimension: usize) -> Result<Self, EmbeddingError> {
        let client = build_client(config.timeout)?;

        tracing::info!(
            "Created TextsEmbedProvider: model={}, dimension={}, base_url={}",
            config.model,
            dimension,
            config.base_url
        );

        Ok(Self {
            client,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            dimension,
        })
    }
}

#[async_trait]
impl EmbedProvider for TextsEmbedProvider {
    async fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let normalized: Vec<String> = texts.iter().map(|t| normalize_for_embedding(t)).collect();
        let url = format!("{}/embed", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&TextsEmbedRequest { texts: &normalized })
            .send()
            .await
            .map_err(EmbeddingError::transport)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = error_body(response).await;
            tracing::error!("Embed service error ({}): {}", status, body);
            return Err(EmbeddingError::Status { status, body });
        }

        let body = response.text().await.map_err(EmbeddingError::transport)?;
        let embed_response: TextsEmbedResponse = serde_json::from_str(&body)
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        check_batch(texts.len(), self.dimension, embed_response.embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model(&self) -> &str {
        &self.model
    }
}

pub fn create(
    config: &ProviderConfig,
    dimension: usize,
) -> Result<Box<dyn EmbedProvider>, EmbeddingError> {
    Ok(Box::new(TextsEmbedProvider::new(config, dimension)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base_url: String, dimension: usize) -> TextsEmbedProvider {
        let config = ProviderConfig {
            provider_name: "local".to_string(),
            api_key: String::new(),
            base_url,
            model: "bge-base-zh".to_string(),
            dimension: Some(dimension),
            timeout: Duration::from_millis(500),
        };
        TextsEmbedProvider::new(&config, dimension).unwrap()
    }

    #[tokio::test]
    async fn test_empty_input_skips_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let vectors = provider(server.uri(), 2).encode_batch(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }

    #[tokio::test]
    async fn test_batch_preserves_input_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embed"))
            .and(body_json(serde_json::json!({"texts": ["a", "b"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embeddings": [[1.0, 0.0], [0.0, 1.0]]
            })))
            .mount(&server)
            .await;

        let vectors = provider(server.uri(), 2)
            .encode_batch(&["a", "b"])
            .await
            .unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_count_mismatch_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embeddings": []
            })))
            .mount(&server)
            .await;

        let err = provider(server.uri(), 2).encode("a").await.unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::CountMismatch {
                expected: 1,
                actual: 0
            }
        ));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embed"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = provider(server.uri(), 2).encode("a").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_non_2xx_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embed"))
            .respond_with(ResponseTemplate::new(503).set_body_string("loading model"))
            .mount(&server)
            .await;

        let err = provider(server.uri(), 2).encode("a").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_slow_service_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embed"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"embeddings": [[1.0, 0.0]]}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = provider(server.uri(), 2).encode("a").await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Timeout));
    }
}

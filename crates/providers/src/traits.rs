//! Provider Traits

use async_trait::async_trait;
use outfit_types::WeatherSnapshot;

use crate::error::{EmbeddingError, LlmError, WeatherError};

/// Embedding Provider Trait
#[async_trait]
pub trait EmbedProvider: Send + Sync {
    /// 编码单个文本
    async fn encode(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let embeddings = self.encode_batch(&[text]).await?;
        let actual = embeddings.len();
        embeddings
            .into_iter()
            .next()
            .ok_or(EmbeddingError::CountMismatch {
                expected: 1,
                actual,
            })
    }

    /// 批量编码文本，输出与输入一一对应且顺序一致
    async fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// 获取向量维度
    fn dimension(&self) -> usize;

    /// 模型名称
    fn model(&self) -> &str;
}

/// Chat Completion Provider Trait
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// 单轮对话，返回第一个 choice 的文本
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Weather Provider Trait
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// 获取指定地点的当日天气
    async fn get_weather(&self, location: &str) -> Result<WeatherSnapshot, WeatherError>;
}

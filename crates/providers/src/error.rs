//! 各远程服务的错误类型

use thiserror::Error;

/// Embedding 服务错误
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding request timed out")]
    Timeout,

    #[error("embedding API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),

    /// 返回的向量数量与请求的文本数量不一致
    #[error("embedding count mismatch: requested {expected}, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl EmbeddingError {
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EmbeddingError::Timeout
        } else {
            EmbeddingError::Http(err)
        }
    }
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LLM request timed out")]
    Timeout,

    #[error("LLM API error ({status}): {body}")]
    Status { status: u16, body: String },

    #[error("invalid LLM response: {0}")]
    InvalidResponse(String),

    #[error("LLM response has no choices")]
    EmptyChoices,

    #[error("LLM response content is empty")]
    EmptyContent,
}

impl LlmError {
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Http(err)
        }
    }
}

/// 天气服务错误
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("weather request timed out")]
    Timeout,

    #[error("weather API request failed with status {0}")]
    Status(u16),

    #[error("weather API request failed with code {0}")]
    ApiCode(String),

    #[error("no daily weather data")]
    NoDailyData,

    #[error("invalid weather response: {0}")]
    InvalidResponse(String),

    #[error("weather API key not set")]
    MissingApiKey,
}

impl WeatherError {
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WeatherError::Timeout
        } else {
            WeatherError::Http(err)
        }
    }
}

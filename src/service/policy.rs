use model_provider::{EmbeddingError, WeatherError};
use outfit_types::{StoreError, WeatherSnapshot};
use thiserror::Error;

/// 推荐流程中的上游阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Weather,
    Retrieval,
    Llm,
}

/// 阶段失败后的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    /// 记录日志并使用降级值继续
    Mask,
    /// 终止请求并把错误返回给调用方
    Propagate,
}

impl Stage {
    pub fn on_failure(self) -> OnFailure {
        match self {
            Stage::Weather | Stage::Retrieval => OnFailure::Mask,
            Stage::Llm => OnFailure::Propagate,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Weather => "weather",
            Stage::Retrieval => "retrieval",
            Stage::Llm => "llm",
        };
        f.write_str(name)
    }
}

/// 检索阶段的上游错误（embedding 或向量库）
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// 降级策略：天气和检索失败时给出替代值
#[derive(Debug, Clone)]
pub struct FallbackPolicy {
    default_weather: WeatherSnapshot,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::new(WeatherSnapshot::new(15.0, 25.0, "sunny"))
    }
}

impl FallbackPolicy {
    pub fn new(default_weather: WeatherSnapshot) -> Self {
        Self { default_weather }
    }

    /// 天气获取失败：使用默认天气
    pub fn weather(&self, location: &str, err: &WeatherError) -> WeatherSnapshot {
        tracing::warn!(
            "Weather lookup for '{}' failed, using default weather ({}): {}",
            location,
            self.default_weather.condition,
            err
        );
        self.default_weather.clone()
    }

    /// 规则检索失败：使用空规则列表
    pub fn rules(&self, err: &UpstreamError) -> Vec<String> {
        tracing::warn!("Rule retrieval failed, continuing without rules: {}", err);
        Vec::new()
    }
}

mod common;
mod config;
mod error;
mod traits;

// 各供应商模块（feature gated）
#[cfg(feature = "local")]
mod local;
#[cfg(feature = "openai")]
mod openai;
#[cfg(feature = "qweather")]
mod qweather;

pub use config::ProviderConfig;
pub use error::{EmbeddingError, LlmError, WeatherError};
pub use traits::{ChatProvider, EmbedProvider, WeatherProvider};

/// 创建 Embedding Provider
pub fn create_embed_provider(config: &ProviderConfig) -> anyhow::Result<Box<dyn EmbedProvider>> {
    let dimension = config
        .dimension
        .ok_or_else(|| anyhow::anyhow!("Missing 'dimension' for embed provider"))?;

    match config.provider_name.as_str() {
        #[cfg(feature = "local")]
        "local" => Ok(local::embed::create(config, dimension)?),
        #[cfg(feature = "openai")]
        "openai" | "ollama" => Ok(openai::embed::create(config, dimension)?),
        other => anyhow::bail!("Unknown or disabled embed provider: {}", other),
    }
}

/// 创建 Chat Provider
pub fn create_chat_provider(config: &ProviderConfig) -> anyhow::Result<Box<dyn ChatProvider>> {
    match config.provider_name.as_str() {
        #[cfg(feature = "openai")]
        "openai" | "deepseek" | "ollama" => Ok(openai::chat::create(config)?),
        other => anyhow::bail!("Unknown or disabled LLM provider: {}", other),
    }
}

/// 创建 Weather Provider
pub fn create_weather_provider(
    config: &ProviderConfig,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    match config.provider_name.as_str() {
        #[cfg(feature = "qweather")]
        "qweather" => Ok(qweather::weather::create(config)?),
        other => anyhow::bail!("Unknown or disabled weather provider: {}", other),
    }
}

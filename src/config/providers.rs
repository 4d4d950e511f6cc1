use anyhow::{Context, Result};
use model_provider::ProviderConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// 服务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Embed,
    Llm,
    Weather,
}

/// 服务配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    pub base_url: String,
    #[serde(default)]
    pub model: String,
    #[serde(flatten)]
    pub extra: HashMap<String, toml::Value>,
}

/// Provider 配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderEntry {
    #[serde(default)]
    pub name: String,
    /// 直接写在配置里的 API key
    #[serde(default)]
    pub api_key: String,
    /// 保存 API key 的环境变量名（api_key 为空时使用）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(flatten)]
    pub services: HashMap<String, ServiceConfig>,
}

impl ProviderEntry {
    fn resolve_api_key(&self) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone();
        }

        self.api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .unwrap_or_default()
    }
}

/// 所有 Provider 配置
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProvidersConfig {
    #[serde(flatten)]
    providers: HashMap<String, ProviderEntry>,
}

impl ProvidersConfig {
    pub const FILE_NAME: &'static str = "providers.toml";

    /// 从配置目录加载 providers.toml
    pub fn load_from(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            anyhow::bail!(
                "Providers configuration not found at: {}\nRun 'outfit init' or create it from providers.example.toml",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(&config_path).with_context(|| {
            format!("Failed to read providers config: {}", config_path.display())
        })?;

        let config: Self = toml::from_str(&content).with_context(|| {
            format!(
                "Failed to parse providers config: {}",
                config_path.display()
            )
        })?;

        tracing::debug!("Loaded providers config from: {}", config_path.display());
        tracing::debug!(
            "Available providers: {:?}",
            config.providers.keys().collect::<Vec<_>>()
        );

        Ok(config)
    }

    /// 获取服务配置（如 "local.embed"），并校验服务类型
    pub fn get_service(&self, reference: &str, expected: ServiceType) -> Result<ResolvedService> {
        let (provider_name, service_name) = reference.split_once('.').with_context(|| {
            format!(
                "Invalid service reference: '{}'. Expected format: 'provider.service' (e.g., 'local.embed')",
                reference
            )
        })?;

        let provider = self
            .providers
            .get(provider_name)
            .with_context(|| format!("Provider '{}' not found in providers.toml", provider_name))?;

        let service = provider.services.get(service_name).with_context(|| {
            format!(
                "Service '{}' not found in provider '{}'",
                service_name, provider_name
            )
        })?;

        if service.service_type != expected {
            anyhow::bail!(
                "Service '{}' has type {:?}, expected {:?}",
                reference,
                service.service_type,
                expected
            );
        }

        Ok(ResolvedService {
            provider_name: provider_name.to_string(),
            api_key: provider.resolve_api_key(),
            base_url: service.base_url.clone(),
            model: service.model.clone(),
            extra: service.extra.clone(),
        })
    }
}

/// 解析后的服务配置
#[derive(Debug, Clone)]
pub struct ResolvedService {
    pub provider_name: String,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub extra: HashMap<String, toml::Value>,
}

impl ResolvedService {
    /// 获取整数类型的额外参数
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.extra.get(key).and_then(|v| v.as_integer())
    }

    /// 获取字符串类型的额外参数
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }

    /// 转换为 provider 客户端配置
    ///
    /// `api` 指定接口协议（如 "openai"），未指定时使用 provider 名称。
    pub fn to_provider_config(&self, timeout: Duration) -> ProviderConfig {
        ProviderConfig {
            provider_name: self
                .get_str("api")
                .unwrap_or(&self.provider_name)
                .to_string(),
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            dimension: self
                .get_int("dimension")
                .and_then(|d| usize::try_from(d).ok()),
            timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROVIDERS: &str = r#"
[local]
name = "本地 Embedding 服务"

  [local.embed]
  type = "embed"
  base_url = "http://localhost:8000"
  model = "bge-base-zh"
  dimension = 768

[deepseek]
name = "DeepSeek"
api_key = "sk-test"

  [deepseek.llm]
  type = "llm"
  base_url = "https://api.deepseek.com/v1"
  model = "deepseek-chat"

[qweather]
name = "和风天气"
api_key_env = "OUTFIT_TEST_WEATHER_KEY"

  [qweather.weather]
  type = "weather"
  base_url = "https://api.qweather.com/v7"
    "#;

    #[test]
    fn test_parse_providers_config() {
        let config: ProvidersConfig = toml::from_str(PROVIDERS).unwrap();

        assert_eq!(config.providers.len(), 3);

        let resolved = config.get_service("local.embed", ServiceType::Embed).unwrap();
        assert_eq!(resolved.provider_name, "local");
        assert_eq!(resolved.model, "bge-base-zh");
        assert_eq!(resolved.get_int("dimension"), Some(768));

        let provider = resolved.to_provider_config(Duration::from_secs(30));
        assert_eq!(provider.dimension, Some(768));
        assert_eq!(provider.timeout, Duration::from_secs(30));

        let llm = config.get_service("deepseek.llm", ServiceType::Llm).unwrap();
        assert_eq!(llm.api_key, "sk-test");
    }

    #[test]
    fn test_api_key_from_env() {
        let config: ProvidersConfig = toml::from_str(PROVIDERS).unwrap();

        std::env::set_var("OUTFIT_TEST_WEATHER_KEY", "wk-from-env");
        let weather = config
            .get_service("qweather.weather", ServiceType::Weather)
            .unwrap();
        assert_eq!(weather.api_key, "wk-from-env");
    }

    #[test]
    fn test_api_overrides_provider_name() {
        let config: ProvidersConfig = toml::from_str(
            r#"
[siliconflow]
api_key = "sk-sf"

  [siliconflow.embed]
  type = "embed"
  api = "openai"
  base_url = "https://api.siliconflow.cn/v1"
  model = "BAAI/bge-m3"
  dimension = 1024
            "#,
        )
        .unwrap();

        let resolved = config
            .get_service("siliconflow.embed", ServiceType::Embed)
            .unwrap();
        assert_eq!(resolved.get_str("api"), Some("openai"));

        let provider = resolved.to_provider_config(Duration::from_secs(30));
        assert_eq!(provider.provider_name, "openai");
        assert_eq!(provider.api_key, "sk-sf");
        assert_eq!(provider.dimension, Some(1024));
    }

    #[test]
    fn test_service_type_mismatch() {
        let config: ProvidersConfig = toml::from_str(PROVIDERS).unwrap();
        assert!(config.get_service("local.embed", ServiceType::Llm).is_err());
    }

    #[test]
    fn test_invalid_reference() {
        let config: ProvidersConfig = toml::from_str(PROVIDERS).unwrap();
        assert!(config.get_service("local", ServiceType::Embed).is_err());
        assert!(config.get_service("missing.embed", ServiceType::Embed).is_err());
        assert!(config.get_service("local.rerank", ServiceType::Embed).is_err());
    }
}

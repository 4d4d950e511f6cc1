use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use outfit_types::WeatherSnapshot;

/// 外部调用超时（秒）
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimeoutConfig {
    #[serde(default = "default_embedding_timeout")]
    pub embedding: u64,

    #[serde(default = "default_llm_timeout")]
    pub llm: u64,

    #[serde(default = "default_weather_timeout")]
    pub weather: u64,

    #[serde(default = "default_store_timeout")]
    pub store: u64,

    /// 整个推荐流程的截止时间
    #[serde(default = "default_request_timeout")]
    pub request: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            embedding: default_embedding_timeout(),
            llm: default_llm_timeout(),
            weather: default_weather_timeout(),
            store: default_store_timeout(),
            request: default_request_timeout(),
        }
    }
}

impl TimeoutConfig {
    pub fn embedding(&self) -> Duration {
        Duration::from_secs(self.embedding)
    }

    pub fn llm(&self) -> Duration {
        Duration::from_secs(self.llm)
    }

    pub fn weather(&self) -> Duration {
        Duration::from_secs(self.weather)
    }

    pub fn store(&self) -> Duration {
        Duration::from_secs(self.store)
    }

    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request)
    }
}

fn default_embedding_timeout() -> u64 {
    30
}

fn default_llm_timeout() -> u64 {
    60
}

fn default_weather_timeout() -> u64 {
    10
}

fn default_store_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    120
}

/// HTTP 服务配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// 监听地址（默认: 0.0.0.0:8080）
    #[serde(default = "default_addr")]
    pub addr: SocketAddr,

    /// 请求未携带 loc 时使用的地点（默认: Shanghai）
    #[serde(default = "default_server_location")]
    pub location: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            location: default_server_location(),
        }
    }
}

fn default_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_server_location() -> String {
    "Shanghai".to_string()
}

/// 天气服务不可用时使用的默认天气
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FallbackConfig {
    #[serde(default = "default_fallback_min")]
    pub min_temp: f64,

    #[serde(default = "default_fallback_max")]
    pub max_temp: f64,

    #[serde(default = "default_fallback_condition")]
    pub condition: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            min_temp: default_fallback_min(),
            max_temp: default_fallback_max(),
            condition: default_fallback_condition(),
        }
    }
}

impl FallbackConfig {
    pub fn weather(&self) -> WeatherSnapshot {
        WeatherSnapshot::new(self.min_temp, self.max_temp, self.condition.clone())
    }
}

fn default_fallback_min() -> f64 {
    15.0
}

fn default_fallback_max() -> f64 {
    25.0
}

fn default_fallback_condition() -> String {
    "sunny".to_string()
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Embedding 服务引用（如 "local.embed"）
    pub embedding: String,

    /// LLM 服务引用（如 "deepseek.llm"）
    pub llm: String,

    /// 天气服务引用（如 "qweather.weather"）
    pub weather: String,

    /// 向量库路径（可选，默认: <配置目录>/store）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,

    /// 集合名称（默认: outfit_preferences）
    #[serde(default = "default_collection")]
    pub collection: String,

    /// 规则文件路径（默认: data/clothing_rules.json）
    #[serde(default = "default_rules_path")]
    pub rules_path: PathBuf,

    /// 每次检索的规则数量（默认: 3）
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// 默认风格偏好（默认: casual）
    #[serde(default = "default_preference")]
    pub default_preference: String,

    /// CLI 默认地点（默认: Beijing）
    #[serde(default = "default_location")]
    pub default_location: String,

    /// 是否把推荐结果写回向量库
    #[serde(default)]
    pub remember_recommendations: bool,

    /// 启动服务时是否导入规则（默认: true）
    #[serde(default = "default_true")]
    pub ingest_on_start: bool,

    #[serde(default)]
    pub timeouts: TimeoutConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub fallback: FallbackConfig,
}

fn default_collection() -> String {
    "outfit_preferences".to_string()
}

fn default_rules_path() -> PathBuf {
    PathBuf::from("data/clothing_rules.json")
}

fn default_top_k() -> usize {
    3
}

fn default_preference() -> String {
    outfit_types::DEFAULT_PREFERENCE.to_string()
}

fn default_location() -> String {
    "Beijing".to_string()
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    pub const FILE_NAME: &'static str = "config.toml";

    /// 全局 .outfit 目录：~/.outfit/
    pub fn global_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".outfit")
    }

    /// 本地 .outfit 目录：./.outfit/
    pub fn local_dir() -> PathBuf {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".outfit")
    }

    /// 确定配置目录
    /// - 显式指定配置文件时使用其所在目录
    /// - 否则优先本地 ./.outfit，其次全局 ~/.outfit
    pub fn resolve_dir(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
        }

        let local = Self::local_dir();
        if local.join(Self::FILE_NAME).exists() {
            local
        } else {
            Self::global_dir()
        }
    }

    /// 加载配置文件
    pub fn load(explicit: Option<&Path>) -> Result<(Self, PathBuf)> {
        let dir = Self::resolve_dir(explicit);
        let path = explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| dir.join(Self::FILE_NAME));

        if !path.exists() {
            anyhow::bail!(
                "Configuration not found at: {}\nRun 'outfit init' or create it from config.example.toml",
                path.display()
            );
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        tracing::debug!("Loaded app config from: {}", path.display());
        tracing::debug!("Embedding: {}", config.embedding);
        tracing::debug!("LLM: {}", config.llm);
        tracing::debug!("Weather: {}", config.weather);

        Ok((config, dir))
    }

    /// 获取向量库路径
    pub fn get_store_path(&self, config_dir: &Path) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(|| config_dir.join("store"))
    }
}

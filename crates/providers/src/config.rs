use std::time::Duration;

/// Provider 配置
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider_name: String,
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub dimension: Option<usize>,
    /// 单次 HTTP 请求的超时
    pub timeout: Duration,
}

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use model_provider::{
    create_chat_provider, create_embed_provider, create_weather_provider, EmbedProvider,
};
use outfit_local::LocalVectorStore;
use outfit_types::{StorageConfig, VectorStore};

use crate::config::{AppConfig, ProvidersConfig, ServiceType};
use crate::service::policy::FallbackPolicy;
use crate::service::recommend::Recommender;

/// 命令共享的运行环境：配置、向量库连接和 embedding 客户端
pub struct AppContext {
    pub config: AppConfig,
    pub providers: ProvidersConfig,
    pub store_path: PathBuf,
    pub store: Arc<LocalVectorStore>,
    pub embedder: Arc<dyn EmbedProvider>,
}

impl AppContext {
    /// 加载配置并连接向量库
    pub async fn load(config_path: Option<&Path>) -> Result<Self> {
        let (config, config_dir) = AppConfig::load(config_path)?;
        let providers = ProvidersConfig::load_from(&config_dir)?;

        let embed_service = providers.get_service(&config.embedding, ServiceType::Embed)?;
        let embed_config = embed_service.to_provider_config(config.timeouts.embedding());
        let embedder: Arc<dyn EmbedProvider> = Arc::from(
            create_embed_provider(&embed_config).with_context(|| {
                format!("Failed to create embed provider '{}'", config.embedding)
            })?,
        );

        let store_path = config.get_store_path(&config_dir);
        let storage_config = StorageConfig {
            path: store_path.to_string_lossy().to_string(),
            collection: config.collection.clone(),
            dimension: embedder.dimension(),
            model: embedder.model().to_string(),
            timeout: config.timeouts.store(),
        };

        let store = LocalVectorStore::connect(&storage_config)
            .await
            .with_context(|| format!("Failed to open vector store at {}", store_path.display()))?;

        Ok(Self {
            config,
            providers,
            store_path,
            store: Arc::new(store),
            embedder,
        })
    }

    /// 构建推荐编排器（天气与 LLM 客户端仅在这里创建）
    pub fn recommender(&self) -> Result<Recommender> {
        let timeouts = &self.config.timeouts;

        let weather_service = self
            .providers
            .get_service(&self.config.weather, ServiceType::Weather)?;
        let weather = create_weather_provider(
            &weather_service.to_provider_config(timeouts.weather()),
        )
        .with_context(|| {
            format!(
                "Failed to create weather provider '{}'",
                self.config.weather
            )
        })?;

        let llm_service = self
            .providers
            .get_service(&self.config.llm, ServiceType::Llm)?;
        let llm = create_chat_provider(&llm_service.to_provider_config(timeouts.llm()))
            .with_context(|| format!("Failed to create LLM provider '{}'", self.config.llm))?;

        let store: Arc<dyn VectorStore> = self.store.clone();

        Ok(Recommender::new(
            Arc::from(weather),
            self.embedder.clone(),
            store,
            Arc::from(llm),
        )
        .with_policy(FallbackPolicy::new(self.config.fallback.weather()))
        .with_top_k(self.config.top_k)
        .with_memory(self.config.remember_recommendations)
        .with_memory_timeout(timeouts.store()))
    }
}

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use model_provider::{ChatProvider, EmbedProvider, LlmError, WeatherProvider};
use outfit_types::{
    NewRecord, RecommendationRequest, RecommendationResult, RuleAttributes, RuleFilter,
    VectorStore, WeatherSnapshot, FIELD_LIMITS,
};
use thiserror::Error;

use crate::llm::build_prompt;
use crate::service::context::AppContext;
use crate::service::policy::{FallbackPolicy, Stage, UpstreamError};
use crate::ui::Output;

/// 推荐流程错误（天气与检索失败已被降级策略吸收）
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("recommendation deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

/// 推荐编排器：天气 → 检索 → prompt → LLM
///
/// 所有依赖通过构造函数注入，可在多个并发请求间共享。
pub struct Recommender {
    weather: Arc<dyn WeatherProvider>,
    embedder: Arc<dyn EmbedProvider>,
    store: Arc<dyn VectorStore>,
    llm: Arc<dyn ChatProvider>,
    policy: FallbackPolicy,
    top_k: usize,
    remember: bool,
    remember_timeout: Duration,
}

impl Recommender {
    pub fn new(
        weather: Arc<dyn WeatherProvider>,
        embedder: Arc<dyn EmbedProvider>,
        store: Arc<dyn VectorStore>,
        llm: Arc<dyn ChatProvider>,
    ) -> Self {
        Self {
            weather,
            embedder,
            store,
            llm,
            policy: FallbackPolicy::default(),
            top_k: 3,
            remember: false,
            remember_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// 生成推荐后把问答写回向量库
    pub fn with_memory(mut self, remember: bool) -> Self {
        self.remember = remember;
        self
    }

    /// 写回向量库的时间上限，不计入请求截止时间
    pub fn with_memory_timeout(mut self, timeout: Duration) -> Self {
        self.remember_timeout = timeout;
        self
    }

    /// 生成一次推荐
    pub async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResult, RecommendError> {
        let result = self.generate(request).await?;
        self.remember_result(request, &result).await;
        Ok(result)
    }

    /// 带截止时间的推荐；超时后丢弃正在进行的上游调用
    ///
    /// 截止时间只约束天气、检索和 LLM，写回在答案生成之后单独限时。
    pub async fn recommend_with_deadline(
        &self,
        request: &RecommendationRequest,
        deadline: Duration,
    ) -> Result<RecommendationResult, RecommendError> {
        let result = match tokio::time::timeout(deadline, self.generate(request)).await {
            Ok(result) => result?,
            Err(_) => return Err(RecommendError::DeadlineExceeded(deadline)),
        };
        self.remember_result(request, &result).await;
        Ok(result)
    }

    /// 天气 → 检索 → prompt → LLM
    async fn generate(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResult, RecommendError> {
        let question = request.user_input.trim();
        if question.is_empty() {
            return Err(RecommendError::Validation(
                "question must not be empty".to_string(),
            ));
        }
        let preference = request.effective_preference();

        let weather = match self.weather.get_weather(&request.location).await {
            Ok(weather) => weather,
            Err(e) => self.policy.weather(&request.location, &e),
        };
        tracing::debug!(
            "[{}] {}: {}°C ~ {}°C, {}",
            Stage::Weather,
            request.location,
            weather.min_temp,
            weather.max_temp,
            weather.condition
        );

        let rules = match self.retrieve(question, preference, &weather).await {
            Ok(rules) => rules,
            Err(e) => self.policy.rules(&e),
        };
        tracing::debug!("[{}] {} rule(s) matched", Stage::Retrieval, rules.len());

        let prompt = build_prompt(question, preference, &weather, &rules);
        let text = match self.llm.complete(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    "[{}] failed ({:?}): {}",
                    Stage::Llm,
                    Stage::Llm.on_failure(),
                    e
                );
                return Err(e.into());
            }
        };
        tracing::debug!("[{}] {} characters", Stage::Llm, text.chars().count());

        Ok(RecommendationResult {
            text,
            weather,
            rules,
        })
    }

    /// 编码问题并按天气/偏好过滤检索规则
    async fn retrieve(
        &self,
        question: &str,
        preference: &str,
        weather: &WeatherSnapshot,
    ) -> Result<Vec<String>, UpstreamError> {
        let vector = self.embedder.encode(question).await?;
        let filter = RuleFilter::for_weather(weather, preference);
        Ok(self.store.search(vector, &filter, self.top_k).await?)
    }

    /// 开启记忆时写回问答，失败或超时只记日志
    async fn remember_result(
        &self,
        request: &RecommendationRequest,
        result: &RecommendationResult,
    ) {
        if !self.remember {
            return;
        }

        let question = request.user_input.trim();
        let stored = tokio::time::timeout(self.remember_timeout, self.remember(question, result));
        match stored.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("Failed to store recommendation: {}", e),
            Err(_) => tracing::warn!(
                "Storing recommendation timed out after {:?}",
                self.remember_timeout
            ),
        }
    }

    /// 保存用户问题与推荐结果
    ///
    /// 属性留空，记录只作为语义记忆，不会被规则过滤条件命中。
    async fn remember(
        &self,
        question: &str,
        result: &RecommendationResult,
    ) -> Result<(), UpstreamError> {
        let text = truncate_chars(
            &format!(
                "User preference: {} | Recommended outfit: {}",
                question, result.text
            ),
            FIELD_LIMITS.text,
        );
        let vector = self.embedder.encode(&text).await?;

        let record = NewRecord {
            text,
            vector,
            attributes: RuleAttributes::default(),
        };

        self.store.insert(record).await?;
        Ok(())
    }
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// `outfit recommend` 命令：推荐结果输出到标准输出
pub async fn recommend(
    config_path: Option<&Path>,
    question: &str,
    preference: Option<&str>,
    location: Option<&str>,
) -> anyhow::Result<()> {
    let output = Output::new();
    let ctx = AppContext::load(config_path).await?;
    let recommender = ctx.recommender()?;

    let request = RecommendationRequest::new(
        question,
        preference.unwrap_or(&ctx.config.default_preference),
        location.unwrap_or(&ctx.config.default_location),
    );
    output.status(
        "Recommending",
        &format!("for {} ({})", request.location, request.effective_preference()),
    );

    let result = recommender
        .recommend_with_deadline(&request, ctx.config.timeouts.request())
        .await;
    ctx.store.close().await?;
    let result = result?;

    output.weather(&result.weather);
    output.stats(&[("rules matched", result.rules.len())]);
    output.recommendation(&result.text);

    Ok(())
}

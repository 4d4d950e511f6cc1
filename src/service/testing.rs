//! 推荐流程测试用的内存实现

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use model_provider::{
    ChatProvider, EmbedProvider, EmbeddingError, LlmError, WeatherError, WeatherProvider,
};
use outfit_types::{
    ClothingRule, NewRecord, RuleFilter, StorageConfig, StoreError, VectorStore,
    WeatherSnapshot, FIELD_LIMITS,
};

pub struct StubWeather {
    snapshot: Option<WeatherSnapshot>,
}

impl StubWeather {
    pub fn ok(snapshot: WeatherSnapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
        }
    }

    pub fn failing() -> Self {
        Self { snapshot: None }
    }
}

#[async_trait]
impl WeatherProvider for StubWeather {
    async fn get_weather(&self, _location: &str) -> Result<WeatherSnapshot, WeatherError> {
        self.snapshot.clone().ok_or(WeatherError::Status(500))
    }
}

/// 按字符散列出确定性的向量
pub struct StubEmbedder {
    dimension: usize,
    fail_on: Option<String>,
    fail_all: bool,
    calls: AtomicUsize,
}

impl StubEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            fail_on: None,
            fail_all: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(dimension: usize) -> Self {
        Self {
            fail_all: true,
            ..Self::new(dimension)
        }
    }

    /// 包含 `needle` 的文本编码失败
    pub fn failing_on(dimension: usize, needle: &str) -> Self {
        Self {
            fail_on: Some(needle.to_string()),
            ..Self::new(dimension)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimension];
        for (i, c) in text.chars().enumerate() {
            vector[i % self.dimension] += (c as u32 % 31) as f32 / 31.0;
        }
        vector
    }
}

#[async_trait]
impl EmbedProvider for StubEmbedder {
    async fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let should_fail = self.fail_all
            || texts.iter().any(|text| {
                self.fail_on
                    .as_deref()
                    .map(|needle| text.contains(needle))
                    .unwrap_or(false)
            });
        if should_fail {
            return Err(EmbeddingError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }

        Ok(texts.iter().map(|text| self.vector_for(text)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model(&self) -> &str {
        "stub-embed"
    }
}

pub struct StubLlm {
    reply: Option<String>,
    delay: Option<Duration>,
    prompts: Mutex<Vec<String>>,
}

impl StubLlm {
    pub fn reply(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            delay: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            delay: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ChatProvider for StubLlm {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone().ok_or(LlmError::EmptyChoices)
    }
}

/// 内存向量库：过滤条件在客户端求值，按 L2 距离排序
pub struct MemoryStore {
    dimension: usize,
    records: Mutex<Vec<NewRecord>>,
    filters: Mutex<Vec<RuleFilter>>,
    insert_delay: Option<Duration>,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            records: Mutex::new(Vec::new()),
            filters: Mutex::new(Vec::new()),
            insert_delay: None,
            closed: AtomicBool::new(false),
        }
    }

    /// 每次写入前等待
    pub fn with_insert_delay(mut self, delay: Duration) -> Self {
        self.insert_delay = Some(delay);
        self
    }

    pub async fn seed(&self, embedder: &StubEmbedder, rule: ClothingRule) {
        let text = rule.describe();
        let vector = embedder.encode(&text).await.unwrap();
        self.insert(NewRecord {
            text,
            vector,
            attributes: rule.attributes(),
        })
        .await
        .unwrap();
    }

    pub fn records(&self) -> Vec<NewRecord> {
        self.records.lock().unwrap().clone()
    }

    /// 收到的检索过滤条件
    pub fn filters(&self) -> Vec<RuleFilter> {
        self.filters.lock().unwrap().clone()
    }

    fn check_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }
}

fn l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn connect(config: &StorageConfig) -> Result<Self, StoreError> {
        Ok(Self::new(config.dimension))
    }

    fn collection(&self) -> &str {
        "memory"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn ensure_collection(&self) -> Result<(), StoreError> {
        self.check_open()
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.check_open()?;
        Ok(self.records.lock().unwrap().len())
    }

    async fn insert(&self, record: NewRecord) -> Result<(), StoreError> {
        self.check_open()?;
        if let Some(delay) = self.insert_delay {
            tokio::time::sleep(delay).await;
        }
        FIELD_LIMITS.validate(&record, self.dimension)?;
        self.records.lock().unwrap().push(record);
        Ok(())
    }

    async fn search(
        &self,
        vector: Vec<f32>,
        filter: &RuleFilter,
        top_k: usize,
    ) -> Result<Vec<String>, StoreError> {
        self.check_open()?;
        self.filters.lock().unwrap().push(filter.clone());

        let records = self.records.lock().unwrap();
        let mut hits: Vec<(f32, String)> = records
            .iter()
            .filter(|r| filter.matches(&r.attributes))
            .map(|r| (l2(&r.vector, &vector), r.attributes.outfit.clone()))
            .collect();
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits.truncate(top_k);

        Ok(hits.into_iter().map(|(_, outfit)| outfit).collect())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.check_open()?;
        self.records.lock().unwrap().clear();
        Ok(())
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

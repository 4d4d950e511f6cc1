use anyhow::{Context, Result};
use std::path::Path;

use model_provider::EmbedProvider;
use outfit_types::{NewRecord, RuleSet, VectorStore};

use crate::ui::Output;

/// 规则导入统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub total: usize,
    pub inserted: usize,
    pub failed: usize,
}

/// 读取规则文件
pub fn load_rules(path: &Path) -> Result<RuleSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules file: {}", path.display()))?;

    let rules: RuleSet = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse rules file: {}", path.display()))?;

    tracing::debug!("Loaded {} rules from {}", rules.len(), path.display());
    Ok(rules)
}

/// 逐条编码并写入规则
///
/// 单条规则编码或写入失败只记录日志并跳过，其余规则继续导入。
pub async fn ingest_rules(
    embedder: &dyn EmbedProvider,
    store: &dyn VectorStore,
    rules: &RuleSet,
) -> Result<IngestReport> {
    anyhow::ensure!(
        embedder.dimension() == store.dimension(),
        "Embedding dimension {} does not match collection '{}' ({}d)",
        embedder.dimension(),
        store.collection(),
        store.dimension()
    );

    store
        .ensure_collection()
        .await
        .context("Failed to prepare collection")?;

    let mut report = IngestReport {
        total: rules.len(),
        ..Default::default()
    };

    for (index, rule) in rules.rules.iter().enumerate() {
        let text = rule.describe();

        let vector = match embedder.encode(&text).await {
            Ok(vector) => vector,
            Err(e) => {
                tracing::warn!("Skipping rule #{} ({}): {}", index + 1, rule.outfit, e);
                report.failed += 1;
                continue;
            }
        };

        let record = NewRecord {
            text,
            vector,
            attributes: rule.attributes(),
        };

        match store.insert(record).await {
            Ok(()) => report.inserted += 1,
            Err(e) => {
                tracing::warn!("Failed to store rule #{} ({}): {}", index + 1, rule.outfit, e);
                report.failed += 1;
            }
        }
    }

    tracing::info!(
        "Ingested {}/{} rules into '{}'",
        report.inserted,
        report.total,
        store.collection()
    );
    Ok(report)
}

/// 服务启动时导入规则：集合为空才导入，任何失败只记录日志
pub async fn ingest_on_start(
    embedder: &dyn EmbedProvider,
    store: &dyn VectorStore,
    rules_path: &Path,
) -> Option<IngestReport> {
    match store.count().await {
        Ok(0) => {}
        Ok(existing) => {
            tracing::info!(
                "Collection '{}' already has {} records, skipping rule ingestion",
                store.collection(),
                existing
            );
            return None;
        }
        Err(e) => {
            tracing::warn!("Skipping rule ingestion: {}", e);
            return None;
        }
    }

    let rules = match load_rules(rules_path) {
        Ok(rules) => rules,
        Err(e) => {
            tracing::warn!("Skipping rule ingestion: {:#}", e);
            return None;
        }
    };

    tracing::info!(
        "Ingesting {} rules from {}",
        rules.len(),
        rules_path.display()
    );
    match ingest_rules(embedder, store, &rules).await {
        Ok(report) => Some(report),
        Err(e) => {
            tracing::warn!("Rule ingestion failed, serving without new rules: {:#}", e);
            None
        }
    }
}

/// `outfit ingest` 命令
pub async fn ingest(config_path: Option<&Path>, rules_path: Option<&Path>) -> Result<()> {
    let output = Output::new();
    let ctx = crate::service::context::AppContext::load(config_path).await?;

    let rules_path = rules_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| ctx.config.rules_path.clone());
    let rules = load_rules(&rules_path)?;

    output.database_info(
        &ctx.store_path,
        ctx.store.count().await?,
        ctx.embedder.model(),
        ctx.embedder.dimension(),
    );
    output.status(
        "Ingesting",
        &format!("{} rules from {}", rules.len(), rules_path.display()),
    );

    let report = ingest_rules(ctx.embedder.as_ref(), ctx.store.as_ref(), &rules).await?;

    output.stats(&[("inserted", report.inserted), ("failed", report.failed)]);
    output.finish("ingestion");

    ctx.store.close().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{MemoryStore, StubEmbedder};
    use outfit_types::ClothingRule;

    fn rules(outfits: &[&str]) -> RuleSet {
        RuleSet {
            rules: outfits
                .iter()
                .map(|outfit| ClothingRule {
                    temperature_min: 10,
                    temperature_max: 20,
                    weather: "sunny".to_string(),
                    schedule: String::new(),
                    preference: "casual".to_string(),
                    outfit: outfit.to_string(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_ingest_all_rules() {
        let embedder = StubEmbedder::new(4);
        let store = MemoryStore::new(4);
        let set = rules(&["light jacket", "t-shirt", "hoodie"]);

        let report = ingest_rules(&embedder, &store, &set).await.unwrap();

        assert_eq!(
            report,
            IngestReport {
                total: 3,
                inserted: 3,
                failed: 0
            }
        );
        assert_eq!(embedder.calls(), 3);

        let records = store.records();
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0].text,
            "Temperature 10-20°C, weather sunny, preference casual: light jacket"
        );
        assert_eq!(records[0].attributes.outfit, "light jacket");
        assert_eq!(records[0].vector.len(), 4);
    }

    #[tokio::test]
    async fn test_embedding_failure_skips_only_that_rule() {
        let embedder = StubEmbedder::failing_on(4, "t-shirt");
        let store = MemoryStore::new(4);
        let set = rules(&["light jacket", "t-shirt", "hoodie"]);

        let report = ingest_rules(&embedder, &store, &set).await.unwrap();

        assert_eq!(report.inserted, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(embedder.calls(), 3);

        let outfits: Vec<String> = store
            .records()
            .into_iter()
            .map(|r| r.attributes.outfit)
            .collect();
        assert_eq!(outfits, vec!["light jacket", "hoodie"]);
    }

    #[tokio::test]
    async fn test_store_write_failure_skips_rule() {
        let embedder = StubEmbedder::new(4);
        let store = MemoryStore::new(4);
        let mut set = rules(&["light jacket", "hoodie"]);
        set.rules[0].outfit = "x".repeat(501);

        let report = ingest_rules(&embedder, &store, &set).await.unwrap();

        assert_eq!(report.inserted, 1);
        assert_eq!(report.failed, 1);
    }

    #[tokio::test]
    async fn test_empty_rule_set() {
        let embedder = StubEmbedder::new(4);
        let store = MemoryStore::new(4);

        let report = ingest_rules(&embedder, &store, &RuleSet::default()).await.unwrap();

        assert_eq!(report, IngestReport::default());
        assert_eq!(embedder.calls(), 0);
    }

    #[test]
    fn test_load_rules_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(
            &path,
            r#"{"rules": [{"temperature_min": 0, "temperature_max": 10, "weather": "cloudy",
                "schedule": "", "preference": "casual", "outfit": "wool coat"}]}"#,
        )
        .unwrap();

        let set = load_rules(&path).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.rules[0].outfit, "wool coat");

        assert!(load_rules(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_bundled_rules_parse() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/clothing_rules.json");
        let set = load_rules(&path).unwrap();
        assert!(!set.is_empty());
        assert!(set.rules.iter().all(|r| r.temperature_min <= r.temperature_max));
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_rejected() {
        let embedder = StubEmbedder::new(3);
        let store = MemoryStore::new(4);

        let err = ingest_rules(&embedder, &store, &rules(&["hoodie"]))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("does not match"));
        assert_eq!(embedder.calls(), 0);
        assert!(store.records().is_empty());
    }

    fn write_rules(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("rules.json");
        std::fs::write(&path, serde_json::to_string(&rules(&["hoodie", "t-shirt"])).unwrap())
            .unwrap();
        path
    }

    #[tokio::test]
    async fn test_startup_ingest_only_into_empty_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_rules(&dir);
        let embedder = StubEmbedder::new(4);
        let store = MemoryStore::new(4);

        let report = ingest_on_start(&embedder, &store, &path).await.unwrap();
        assert_eq!(report.inserted, 2);

        // 重启后不重复导入
        assert!(ingest_on_start(&embedder, &store, &path).await.is_none());
        assert_eq!(store.records().len(), 2);
    }

    #[tokio::test]
    async fn test_startup_ingest_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_rules(&dir);
        let embedder = StubEmbedder::new(4);

        let closed = MemoryStore::new(4);
        closed.close().await.unwrap();
        assert!(ingest_on_start(&embedder, &closed, &path).await.is_none());

        let mismatched = MemoryStore::new(8);
        assert!(ingest_on_start(&embedder, &mismatched, &path).await.is_none());

        let missing = dir.path().join("missing.json");
        assert!(ingest_on_start(&embedder, &MemoryStore::new(4), &missing)
            .await
            .is_none());
    }
}

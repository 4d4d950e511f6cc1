use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 集合元数据，记录创建时使用的 embedding 模型和维度
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionMetadata {
    /// 集合名称
    pub collection: String,
    /// Embedding 模型名称
    pub model: String,
    /// 向量维度
    pub dimension: usize,
    /// 集合创建时间
    pub created_at: DateTime<Utc>,
    /// 元数据格式版本
    pub version: String,
}

impl CollectionMetadata {
    pub fn new(collection: String, model: String, dimension: usize) -> Self {
        Self {
            collection,
            model,
            dimension,
            created_at: Utc::now(),
            version: "1.0".to_string(),
        }
    }

    fn file_path(db_path: &Path, collection: &str) -> PathBuf {
        db_path.join(format!("{}.metadata.json", collection))
    }

    /// 加载元数据，文件不存在时返回 None
    pub fn load(db_path: &Path, collection: &str) -> Result<Option<Self>> {
        let metadata_path = Self::file_path(db_path, collection);

        if !metadata_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&metadata_path).with_context(|| {
            format!("Failed to read metadata file: {}", metadata_path.display())
        })?;

        let metadata: Self =
            serde_json::from_str(&content).with_context(|| "Failed to parse metadata file")?;

        Ok(Some(metadata))
    }

    pub fn save(&self, db_path: &Path) -> Result<()> {
        let metadata_path = Self::file_path(db_path, &self.collection);

        let content =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize metadata")?;

        std::fs::write(&metadata_path, content).with_context(|| {
            format!("Failed to write metadata file: {}", metadata_path.display())
        })?;

        Ok(())
    }
}

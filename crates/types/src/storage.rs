use async_trait::async_trait;
use std::time::Duration;

use crate::error::StoreError;
use crate::models::{NewRecord, RuleFilter};

/// 向量存储的统一接口
///
/// 每个实例绑定一个集合（collection），由调用方显式 `connect` / `close`。
/// 实现必须可被多个请求并发共享。
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// 连接存储
    async fn connect(config: &StorageConfig) -> Result<Self, StoreError>
    where
        Self: Sized;

    /// 集合名称
    fn collection(&self) -> &str;

    /// 向量维度（必须等于 embedding 模型输出维度）
    fn dimension(&self) -> usize;

    /// 创建集合（幂等）
    async fn ensure_collection(&self) -> Result<(), StoreError>;

    /// 获取记录总数
    async fn count(&self) -> Result<usize, StoreError>;

    /// 插入一条记录，维度不一致或字段超长时拒绝
    async fn insert(&self, record: NewRecord) -> Result<(), StoreError>;

    /// 过滤后的近邻检索，按 L2 距离升序返回 outfit 文本
    ///
    /// 没有命中时返回空列表而不是错误。
    async fn search(
        &self,
        vector: Vec<f32>,
        filter: &RuleFilter,
        top_k: usize,
    ) -> Result<Vec<String>, StoreError>;

    /// 清空集合中的所有记录
    async fn clear(&self) -> Result<(), StoreError>;

    /// 关闭连接，之后的所有操作返回 `StoreError::Closed`
    async fn close(&self) -> Result<(), StoreError>;
}

/// 存储配置（通用）
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub path: String,
    pub collection: String,
    pub dimension: usize,
    /// embedding 模型名称，写入集合元数据
    pub model: String,
    /// 单次存储调用的超时
    pub timeout: Duration,
}

/// 字符串字段长度上限
#[derive(Debug, Clone, Copy)]
pub struct FieldLimits {
    pub text: usize,
    pub weather: usize,
    pub preference: usize,
    pub outfit: usize,
}

pub const FIELD_LIMITS: FieldLimits = FieldLimits {
    text: 1000,
    weather: 50,
    preference: 50,
    outfit: 500,
};

impl FieldLimits {
    /// 校验记录的维度和各字段长度
    pub fn validate(&self, record: &NewRecord, dimension: usize) -> Result<(), StoreError> {
        if record.vector.len() != dimension {
            return Err(StoreError::DimensionMismatch {
                expected: dimension,
                actual: record.vector.len(),
            });
        }

        let attrs = &record.attributes;
        let fields = [
            ("text", record.text.as_str(), self.text),
            ("weather", attrs.weather.as_str(), self.weather),
            ("preference", attrs.preference.as_str(), self.preference),
            ("outfit", attrs.outfit.as_str(), self.outfit),
        ];

        for (field, value, max_length) in fields {
            let length = value.chars().count();
            if length > max_length {
                return Err(StoreError::FieldTooLong {
                    field,
                    length,
                    max_length,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RuleAttributes;

    fn record(dim: usize) -> NewRecord {
        NewRecord {
            text: "Temperature 10-20°C, weather sunny".to_string(),
            vector: vec![0.1; dim],
            attributes: RuleAttributes {
                temperature_min: 10,
                temperature_max: 20,
                weather: "sunny".to_string(),
                preference: "casual".to_string(),
                outfit: "light jacket".to_string(),
            },
        }
    }

    #[test]
    fn test_validate_accepts_matching_record() {
        assert!(FIELD_LIMITS.validate(&record(4), 4).is_ok());
    }

    #[test]
    fn test_validate_rejects_dimension_mismatch() {
        let err = FIELD_LIMITS.validate(&record(3), 4).unwrap_err();
        assert!(matches!(
            err,
            StoreError::DimensionMismatch {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_validate_counts_characters_not_bytes() {
        let mut rec = record(4);
        rec.attributes.weather = "晴".repeat(50);
        assert!(FIELD_LIMITS.validate(&rec, 4).is_ok());

        rec.attributes.weather = "晴".repeat(51);
        let err = FIELD_LIMITS.validate(&rec, 4).unwrap_err();
        assert!(matches!(
            err,
            StoreError::FieldTooLong {
                field: "weather",
                length: 51,
                max_length: 50
            }
        ));
    }
}

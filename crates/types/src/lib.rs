//! Outfit Types - 数据模型与存储后端接口
//!
//! 不依赖任何数据库或 HTTP 客户端，供存储实现和业务层共享。

mod error;
mod models;
mod storage;

pub use error::{StoreError, StoreOp};
pub use models::{
    ClothingRule, NewRecord, RecommendationRequest, RecommendationResult, RuleAttributes,
    RuleFilter, RuleSet, WeatherSnapshot, DEFAULT_PREFERENCE,
};
pub use storage::{FieldLimits, StorageConfig, VectorStore, FIELD_LIMITS};

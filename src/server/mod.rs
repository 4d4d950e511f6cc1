mod error;
mod handlers;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;

use crate::service::recommend::Recommender;

/// 请求处理共享状态
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub default_preference: String,
    pub default_location: String,
    /// 单个请求的截止时间
    pub deadline: Duration,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/ai_agents/outfit_recommend",
            get(handlers::outfit_recommend),
        )
        .with_state(Arc::new(state))
}

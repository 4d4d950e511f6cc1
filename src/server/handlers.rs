use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use outfit_types::RecommendationRequest;

use super::error::ApiError;
use super::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    pub question: Option<String>,
    pub pref: Option<String>,
    pub loc: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub recommendation: String,
}

/// GET /ai_agents/outfit_recommend?question=&pref=&loc=
pub async fn outfit_recommend(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecommendQuery>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let question = query
        .question
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing 'question' parameter".to_string()))?;

    let preference = query
        .pref
        .unwrap_or_else(|| state.default_preference.clone());
    let location = query
        .loc
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| state.default_location.clone());

    let request = RecommendationRequest::new(question, preference, location);
    tracing::info!(
        "Recommendation request: location={}, preference={}",
        request.location,
        request.effective_preference()
    );

    let result = state
        .recommender
        .recommend_with_deadline(&request, state.deadline)
        .await?;

    Ok(Json(RecommendResponse {
        recommendation: result.text,
    }))
}

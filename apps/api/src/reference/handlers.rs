use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::AppError;
use crate::reference::pick_random_topic;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RandomTopicResponse {
    pub topic_id: String,
    pub topic_text: Value,
}

/// GET /api/conjunctions
pub async fn handle_conjunctions(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, AppError> {
    let list = state
        .reference
        .conjunctions()
        .await
        .map_err(|e| AppError::Internal(e.context("Failed to load conjunctions")))?;
    Ok(Json(list))
}

/// GET /api/hot-topics
pub async fn handle_hot_topics(
    State(state): State<AppState>,
) -> Result<Json<Map<String, Value>>, AppError> {
    let topics = state
        .reference
        .hot_topics()
        .await
        .map_err(|e| AppError::Internal(e.context("Failed to load hot topics")))?;
    Ok(Json(topics))
}

/// GET /api/random-topic
pub async fn handle_random_topic(
    State(state): State<AppState>,
) -> Result<Json<RandomTopicResponse>, AppError> {
    let topics = state
        .reference
        .hot_topics()
        .await
        .map_err(|e| AppError::Internal(e.context("Failed to get random topic")))?;

    let (topic_id, topic_text) = pick_random_topic(&topics)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Hot topic list is empty")))?;

    Ok(Json(RandomTopicResponse {
        topic_id,
        topic_text,
    }))
}

//! Axum route handlers for essay analysis and the tutoring chat.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::essays::repository::save_essay;
use crate::extract::ApiJson;
use crate::feedback::models::FeedbackResult;
use crate::feedback::parser::fallback_feedback;
use crate::feedback::service::{answer_question, review_essay};
use crate::state::AppState;

/// Missing and `null` fields both read as empty.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub topic: Option<String>,
    pub essay: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: Option<String>,
    /// Prior feedback, either as a JSON string or as the feedback object itself.
    #[serde(default)]
    pub context: Value,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// POST /api/analyze
///
/// Grades the essay. Once input validation passes this always answers 200:
/// upstream failures are replaced by the canned fallback feedback.
/// Signed-in callers also get the result saved to their history.
pub async fn handle_analyze(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    ApiJson(request): ApiJson<AnalyzeRequest>,
) -> Result<Json<FeedbackResult>, AppError> {
    let topic = request.topic.unwrap_or_default();
    let essay = request.essay.unwrap_or_default();
    if topic.trim().is_empty() || essay.trim().is_empty() {
        return Err(AppError::Validation(
            "Topic and essay text are required".to_string(),
        ));
    }

    info!("Analyzing essay: {} characters", essay.chars().count());

    let feedback = review_essay(state.llm.as_ref(), &topic, &essay)
        .await
        .unwrap_or_else(|e| {
            warn!("Serving fallback feedback: {e}");
            fallback_feedback()
        });

    if let Some(user) = user {
        match save_essay(&state.db, user.id, &topic, &essay, &feedback).await {
            Ok(record) => info!("Essay saved to database with ID: {}", record.id),
            Err(e) => error!("Error saving essay for user {}: {e:?}", user.id),
        }
    }

    Ok(Json(feedback))
}

/// POST /api/chat
///
/// Tutoring Q&A about earlier feedback. Nothing is persisted.
pub async fn handle_chat(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let question = request.question.unwrap_or_default();
    if question.trim().is_empty() {
        return Err(AppError::Validation("Question is required".to_string()));
    }

    let context = render_context(&request.context);
    let response = answer_question(state.llm.as_ref(), &context, &question)
        .await
        .map_err(|e| AppError::Llm(format!("Chat completion failed: {e}")))?;

    Ok(Json(ChatResponse { response }))
}

fn render_context(context: &Value) -> String {
    match context {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_context_passes_strings_through() {
        assert_eq!(render_context(&json!("{\"a\":1}")), "{\"a\":1}");
    }

    #[test]
    fn test_render_context_serializes_objects() {
        let rendered = render_context(&json!({"overall_score": 6.5}));
        assert!(rendered.contains("\"overall_score\": 6.5"));
    }

    #[test]
    fn test_render_context_null_is_empty() {
        assert_eq!(render_context(&Value::Null), "");
    }
}

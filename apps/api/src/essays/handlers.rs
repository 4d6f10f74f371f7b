//! Axum route handlers for the signed-in user's profile and essay history.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::accounts::find_user_by_id;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::essays::repository::{
    get_essay_by_id, get_user_stats, list_essays_by_user, PageRequest,
};
use crate::feedback::models::{
    CoherenceCohesionFeedback, GrammarCorrection, GrammaticalRangeFeedback,
    LexicalResourceFeedback, RubricScores, TaskAchievementFeedback, VocabularyCorrection,
};
use crate::feedback::parser::round_to_tenth;
use crate::models::essay::{EssayRecord, EssaySummaryRow, UserStatsRow};
use crate::state::AppState;

const TOPIC_PREVIEW_CHARS: usize = 100;
const HISTORY_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: String,
    pub stats: ProfileStats,
}

#[derive(Debug, Default, Serialize)]
pub struct ProfileStats {
    pub total_essays: i64,
    pub average_score: f64,
    pub avg_task_achievement: f64,
    pub avg_coherence_cohesion: f64,
    pub avg_lexical_resource: f64,
    pub avg_grammatical_range_accuracy: f64,
}

impl From<&UserStatsRow> for ProfileStats {
    fn from(row: &UserStatsRow) -> Self {
        Self {
            total_essays: row.total_essays,
            average_score: round_to_tenth(row.average_score),
            avg_task_achievement: round_to_tenth(row.avg_task_achievement),
            avg_coherence_cohesion: round_to_tenth(row.avg_coherence_cohesion),
            avg_lexical_resource: round_to_tenth(row.avg_lexical_resource),
            avg_grammatical_range_accuracy: round_to_tenth(row.avg_grammatical_range_accuracy),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EssaySummary {
    pub id: i64,
    pub topic: String,
    pub overall_score: f64,
    pub task_achievement_score: f64,
    pub coherence_cohesion_score: f64,
    pub lexical_resource_score: f64,
    pub grammatical_range_accuracy_score: f64,
    pub created_at: String,
}

impl From<EssaySummaryRow> for EssaySummary {
    fn from(row: EssaySummaryRow) -> Self {
        Self {
            id: row.id,
            topic: preview_topic(&row.topic),
            overall_score: row.overall_score,
            task_achievement_score: row.task_achievement_score,
            coherence_cohesion_score: row.coherence_cohesion_score,
            lexical_resource_score: row.lexical_resource_score,
            grammatical_range_accuracy_score: row.grammatical_range_accuracy_score,
            created_at: format_timestamp(&row.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EssayHistoryResponse {
    pub essays: Vec<EssaySummary>,
    pub total: i64,
    pub pages: i64,
    pub current_page: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Serialize)]
pub struct StoredStatistics {
    pub linking_words_count: i64,
    pub word_repetition_count: i64,
    pub grammar_mistakes_count: i64,
}

#[derive(Debug, Serialize)]
pub struct EssayDetailResponse {
    pub id: i64,
    pub topic: String,
    pub content: String,
    pub overall_score: f64,
    pub rubric_scores: RubricScores,
    pub statistics: StoredStatistics,
    pub overall_feedback: String,
    pub task_achievement_feedback: TaskAchievementFeedback,
    pub coherence_cohesion_feedback: CoherenceCohesionFeedback,
    pub lexical_resource_feedback: LexicalResourceFeedback,
    pub grammatical_range_accuracy_feedback: GrammaticalRangeFeedback,
    pub grammar_corrections: Vec<GrammarCorrection>,
    pub vocabulary_improvements: Vec<VocabularyCorrection>,
    pub created_at: String,
}

impl From<EssayRecord> for EssayDetailResponse {
    fn from(record: EssayRecord) -> Self {
        Self {
            id: record.id,
            topic: record.topic,
            content: record.content,
            overall_score: record.overall_score,
            rubric_scores: RubricScores {
                task_achievement: record.task_achievement_score,
                coherence_cohesion: record.coherence_cohesion_score,
                lexical_resource: record.lexical_resource_score,
                grammatical_range_accuracy: record.grammatical_range_accuracy_score,
            },
            statistics: StoredStatistics {
                linking_words_count: record.linking_words_count,
                word_repetition_count: record.word_repetition_count,
                grammar_mistakes_count: record.grammar_mistakes_count,
            },
            overall_feedback: record.overall_feedback,
            task_achievement_feedback: record.task_achievement_feedback.0,
            coherence_cohesion_feedback: record.coherence_cohesion_feedback.0,
            lexical_resource_feedback: record.lexical_resource_feedback.0,
            grammatical_range_accuracy_feedback: record.grammatical_range_accuracy_feedback.0,
            grammar_corrections: record.grammar_corrections.0,
            vocabulary_improvements: record.vocabulary_improvements.0,
            created_at: format_timestamp(&record.created_at),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/user/profile
pub async fn handle_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let account = find_user_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.id)))?;

    let stats = get_user_stats(&state.db, user.id)
        .await?
        .as_ref()
        .map(ProfileStats::from)
        .unwrap_or_default();

    Ok(Json(ProfileResponse {
        id: account.id,
        username: account.username,
        email: account.email,
        created_at: account.created_at.to_rfc3339(),
        stats,
    }))
}

/// GET /api/user/essays?page&per_page
pub async fn handle_list_essays(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<EssayHistoryResponse>, AppError> {
    let request = PageRequest::new(query.page, query.per_page);
    let page = list_essays_by_user(&state.db, user.id, request).await?;

    let (pages, has_next, has_prev) = (page.pages(), page.has_next(), page.has_prev());
    Ok(Json(EssayHistoryResponse {
        essays: page.essays.into_iter().map(EssaySummary::from).collect(),
        total: page.total,
        pages,
        current_page: request.page,
        has_next,
        has_prev,
    }))
}

/// GET /api/user/essays/:id
pub async fn handle_get_essay(
    State(state): State<AppState>,
    user: AuthUser,
    Path(essay_id): Path<i64>,
) -> Result<Json<EssayDetailResponse>, AppError> {
    let record = get_essay_by_id(&state.db, user.id, essay_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Essay {essay_id} not found")))?;

    Ok(Json(EssayDetailResponse::from(record)))
}

fn preview_topic(topic: &str) -> String {
    if topic.chars().count() > TOPIC_PREVIEW_CHARS {
        let head: String = topic.chars().take(TOPIC_PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        topic.to_string()
    }
}

fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(HISTORY_TIME_FORMAT).to_string()
}

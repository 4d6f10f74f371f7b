use anyhow::Result;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{FromRow, SqlitePool};
use tracing::{info, warn};

use crate::feedback::models::FeedbackResult;
use crate::models::essay::{EssayRecord, EssaySummaryRow, UserStatsRow};

pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 100;

/// The five score columns of one essay, as read back for the stats recompute.
#[derive(Debug, Clone, Copy, PartialEq, FromRow)]
pub struct EssayScores {
    pub overall_score: f64,
    pub task_achievement_score: f64,
    pub coherence_cohesion_score: f64,
    pub lexical_resource_score: f64,
    pub grammatical_range_accuracy_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsSummary {
    pub total_essays: i64,
    pub average_score: f64,
    pub avg_task_achievement: f64,
    pub avg_coherence_cohesion: f64,
    pub avg_lexical_resource: f64,
    pub avg_grammatical_range_accuracy: f64,
}

/// Page request after defaults and clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(DEFAULT_PER_PAGE)
                .clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

#[derive(Debug, Clone)]
pub struct EssayPage {
    pub essays: Vec<EssaySummaryRow>,
    pub total: i64,
    pub request: PageRequest,
}

impl EssayPage {
    pub fn pages(&self) -> i64 {
        (self.total + self.request.per_page - 1) / self.request.per_page
    }

    pub fn has_next(&self) -> bool {
        self.request.page < self.pages()
    }

    pub fn has_prev(&self) -> bool {
        self.request.page > 1
    }
}

/// Averages every score column over the whole history. `None` for no essays.
pub fn compute_user_stats(scores: &[EssayScores]) -> Option<StatsSummary> {
    if scores.is_empty() {
        return None;
    }
    let n = scores.len() as f64;
    let mean = |pick: fn(&EssayScores) -> f64| scores.iter().map(pick).sum::<f64>() / n;

    Some(StatsSummary {
        total_essays: scores.len() as i64,
        average_score: mean(|s| s.overall_score),
        avg_task_achievement: mean(|s| s.task_achievement_score),
        avg_coherence_cohesion: mean(|s| s.coherence_cohesion_score),
        avg_lexical_resource: mean(|s| s.lexical_resource_score),
        avg_grammatical_range_accuracy: mean(|s| s.grammatical_range_accuracy_score),
    })
}

/// Persists one analysis for `user_id`, then recomputes that user's stats.
/// A failed recompute is logged; the saved essay is still returned.
pub async fn save_essay(
    pool: &SqlitePool,
    user_id: i64,
    topic: &str,
    content: &str,
    feedback: &FeedbackResult,
) -> Result<EssayRecord> {
    let rubric = feedback.rubric_scores;
    let stats = &feedback.statistics;

    let record = sqlx::query_as::<_, EssayRecord>(
        r#"
        INSERT INTO essays
            (user_id, topic, content, overall_score,
             task_achievement_score, coherence_cohesion_score,
             lexical_resource_score, grammatical_range_accuracy_score,
             linking_words_count, word_repetition_count, grammar_mistakes_count,
             overall_feedback, task_achievement_feedback, coherence_cohesion_feedback,
             lexical_resource_feedback, grammatical_range_accuracy_feedback,
             grammar_corrections, vocabulary_improvements, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(topic)
    .bind(content)
    .bind(feedback.overall_score)
    .bind(rubric.task_achievement)
    .bind(rubric.coherence_cohesion)
    .bind(rubric.lexical_resource)
    .bind(rubric.grammatical_range_accuracy)
    .bind(i64::from(stats.linking_words_count))
    .bind(i64::from(stats.word_repetition_count))
    .bind(i64::from(stats.grammar_mistakes_count))
    .bind(&feedback.overall_feedback)
    .bind(Json(&feedback.task_achievement))
    .bind(Json(&feedback.coherence_cohesion))
    .bind(Json(&feedback.lexical_resource))
    .bind(Json(&feedback.grammatical_range_accuracy))
    .bind(Json(&feedback.grammatical_range_accuracy.grammar_corrections))
    .bind(Json(&feedback.lexical_resource.vocabulary_improvements))
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    info!("Inserted essay {} for user {user_id}", record.id);

    if let Err(e) = refresh_user_stats(pool, user_id).await {
        warn!("Error updating stats for user {user_id}: {e:?}");
    }

    Ok(record)
}

/// Full recompute of a user's aggregate from every stored essay, then upsert.
/// Not guarded against concurrent writers for the same user.
pub async fn refresh_user_stats(pool: &SqlitePool, user_id: i64) -> Result<Option<StatsSummary>> {
    let scores = sqlx::query_as::<_, EssayScores>(
        r#"
        SELECT overall_score, task_achievement_score, coherence_cohesion_score,
               lexical_resource_score, grammatical_range_accuracy_score
        FROM essays
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let Some(summary) = compute_user_stats(&scores) else {
        return Ok(None);
    };

    sqlx::query(
        r#"
        INSERT INTO user_stats
            (user_id, total_essays, average_score, avg_task_achievement,
             avg_coherence_cohesion, avg_lexical_resource,
             avg_grammatical_range_accuracy, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (user_id) DO UPDATE SET
            total_essays = excluded.total_essays,
            average_score = excluded.average_score,
            avg_task_achievement = excluded.avg_task_achievement,
            avg_coherence_cohesion = excluded.avg_coherence_cohesion,
            avg_lexical_resource = excluded.avg_lexical_resource,
            avg_grammatical_range_accuracy = excluded.avg_grammatical_range_accuracy,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(user_id)
    .bind(summary.total_essays)
    .bind(summary.average_score)
    .bind(summary.avg_task_achievement)
    .bind(summary.avg_coherence_cohesion)
    .bind(summary.avg_lexical_resource)
    .bind(summary.avg_grammatical_range_accuracy)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(Some(summary))
}

/// Newest first; ties on timestamp fall back to insertion order.
pub async fn list_essays_by_user(
    pool: &SqlitePool,
    user_id: i64,
    request: PageRequest,
) -> Result<EssayPage> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM essays WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    let essays = sqlx::query_as::<_, EssaySummaryRow>(
        r#"
        SELECT id, topic, overall_score, task_achievement_score,
               coherence_cohesion_score, lexical_resource_score,
               grammatical_range_accuracy_score, created_at
        FROM essays
        WHERE user_id = ?
        ORDER BY created_at DESC, id DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(user_id)
    .bind(request.per_page)
    .bind(request.offset())
    .fetch_all(pool)
    .await?;

    Ok(EssayPage {
        essays,
        total,
        request,
    })
}

/// Filters on owner as well as id, so another user's essay reads as missing.
pub async fn get_essay_by_id(
    pool: &SqlitePool,
    user_id: i64,
    essay_id: i64,
) -> Result<Option<EssayRecord>> {
    Ok(
        sqlx::query_as::<_, EssayRecord>("SELECT * FROM essays WHERE id = ? AND user_id = ?")
            .bind(essay_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn get_user_stats(pool: &SqlitePool, user_id: i64) -> Result<Option<UserStatsRow>> {
    Ok(
        sqlx::query_as::<_, UserStatsRow>("SELECT * FROM user_stats WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?,
    )
}

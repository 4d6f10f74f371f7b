use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::feedback::models::{
    CoherenceCohesionFeedback, GrammarCorrection, GrammaticalRangeFeedback,
    LexicalResourceFeedback, TaskAchievementFeedback, VocabularyCorrection,
};

/// Denormalised snapshot of one analysis. Insert-only.
#[derive(Debug, Clone, FromRow)]
pub struct EssayRecord {
    pub id: i64,
    pub user_id: i64,
    pub topic: String,
    pub content: String,
    pub overall_score: f64,
    pub task_achievement_score: f64,
    pub coherence_cohesion_score: f64,
    pub lexical_resource_score: f64,
    pub grammatical_range_accuracy_score: f64,
    pub linking_words_count: i64,
    pub word_repetition_count: i64,
    pub grammar_mistakes_count: i64,
    pub overall_feedback: String,
    pub task_achievement_feedback: Json<TaskAchievementFeedback>,
    pub coherence_cohesion_feedback: Json<CoherenceCohesionFeedback>,
    pub lexical_resource_feedback: Json<LexicalResourceFeedback>,
    pub grammatical_range_accuracy_feedback: Json<GrammaticalRangeFeedback>,
    pub grammar_corrections: Json<Vec<GrammarCorrection>>,
    pub vocabulary_improvements: Json<Vec<VocabularyCorrection>>,
    pub created_at: DateTime<Utc>,
}

/// History list projection: scores only, no feedback blobs.
#[derive(Debug, Clone, FromRow)]
pub struct EssaySummaryRow {
    pub id: i64,
    pub topic: String,
    pub overall_score: f64,
    pub task_achievement_score: f64,
    pub coherence_cohesion_score: f64,
    pub lexical_resource_score: f64,
    pub grammatical_range_accuracy_score: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserStatsRow {
    pub user_id: i64,
    pub total_essays: i64,
    pub average_score: f64,
    pub avg_task_achievement: f64,
    pub avg_coherence_cohesion: f64,
    pub avg_lexical_resource: f64,
    pub avg_grammatical_range_accuracy: f64,
    pub updated_at: DateTime<Utc>,
}

//! Structured essay feedback, shared by the parser, the repository and the HTTP layer.
//!
//! The serde shape is also the JSON schema the review prompt asks the model to emit,
//! so field names here are part of the wire contract with both the model and the browser.

use serde::{Deserialize, Serialize};

/// Upper bound of every IELTS band score.
pub const MAX_BAND: f64 = 9.0;

pub const LINKING_WORDS_GOAL: u32 = 7;
pub const WORD_REPETITION_GOAL: u32 = 3;
pub const GRAMMAR_MISTAKES_GOAL: u32 = 0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackResult {
    pub overall_score: f64,
    #[serde(default)]
    pub overall_feedback: String,
    pub rubric_scores: RubricScores,
    #[serde(default)]
    pub statistics: EssayStatistics,
    #[serde(default)]
    pub task_achievement: TaskAchievementFeedback,
    #[serde(default)]
    pub coherence_cohesion: CoherenceCohesionFeedback,
    #[serde(default)]
    pub lexical_resource: LexicalResourceFeedback,
    #[serde(default)]
    pub grammatical_range_accuracy: GrammaticalRangeFeedback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RubricScores {
    pub task_achievement: f64,
    pub coherence_cohesion: f64,
    pub lexical_resource: f64,
    pub grammatical_range_accuracy: f64,
}

impl RubricScores {
    pub fn uniform(score: f64) -> Self {
        Self {
            task_achievement: score,
            coherence_cohesion: score,
            lexical_resource: score,
            grammatical_range_accuracy: score,
        }
    }

    /// (criterion name, score) pairs in rubric order.
    pub fn entries(&self) -> [(&'static str, f64); 4] {
        [
            ("task_achievement", self.task_achievement),
            ("coherence_cohesion", self.coherence_cohesion),
            ("lexical_resource", self.lexical_resource),
            ("grammatical_range_accuracy", self.grammatical_range_accuracy),
        ]
    }
}

/// Counters the model reports about the essay, each paired with a fixed target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EssayStatistics {
    #[serde(default)]
    pub linking_words_count: u32,
    #[serde(default = "linking_words_goal")]
    pub linking_words_goal: u32,
    #[serde(default)]
    pub word_repetition_count: u32,
    #[serde(default = "word_repetition_goal")]
    pub word_repetition_goal: u32,
    #[serde(default)]
    pub grammar_mistakes_count: u32,
    #[serde(default = "grammar_mistakes_goal")]
    pub grammar_mistakes_goal: u32,
}

fn linking_words_goal() -> u32 {
    LINKING_WORDS_GOAL
}

fn word_repetition_goal() -> u32 {
    WORD_REPETITION_GOAL
}

fn grammar_mistakes_goal() -> u32 {
    GRAMMAR_MISTAKES_GOAL
}

impl Default for EssayStatistics {
    fn default() -> Self {
        Self {
            linking_words_count: 0,
            linking_words_goal: LINKING_WORDS_GOAL,
            word_repetition_count: 0,
            word_repetition_goal: WORD_REPETITION_GOAL,
            grammar_mistakes_count: 0,
            grammar_mistakes_goal: GRAMMAR_MISTAKES_GOAL,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskAchievementFeedback {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_for_improvement: Vec<String>,
    #[serde(default)]
    pub improvement_suggestions: TaskAchievementSuggestions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskAchievementSuggestions {
    pub how_to_address_prompt: String,
    pub how_to_develop_ideas: String,
    pub how_to_stay_on_topic: String,
    pub contextual_development: String,
    pub better_format: String,
    pub text_structure: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoherenceCohesionFeedback {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_for_improvement: Vec<String>,
    #[serde(default)]
    pub improvement_suggestions: CoherenceCohesionSuggestions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoherenceCohesionSuggestions {
    pub logical_organization: String,
    pub thematic_organization: String,
    pub logical_sequencing: String,
    pub referencing_substitution: String,
    pub discourse_markers: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LexicalResourceFeedback {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_for_improvement: Vec<String>,
    #[serde(default)]
    pub vocabulary_improvements: Vec<VocabularyCorrection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GrammaticalRangeFeedback {
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_for_improvement: Vec<String>,
    #[serde(default)]
    pub grammar_corrections: Vec<GrammarCorrection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyCorrection {
    pub incorrect: String,
    pub correct: String,
    pub explanation: String,
    pub error_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarCorrection {
    pub incorrect: String,
    pub correct: String,
    pub explanation: String,
    pub error_type: String,
    pub sentence_context: String,
}

//! Feedback parser: turns the model's raw reply into a validated `FeedbackResult`.
//!
//! Parsing never falls back on its own: it reports an `UpstreamError` and the HTTP
//! boundary decides to substitute `fallback_feedback()`.

use thiserror::Error;

use crate::feedback::models::{
    CoherenceCohesionFeedback, CoherenceCohesionSuggestions, EssayStatistics, FeedbackResult,
    GrammarCorrection, GrammaticalRangeFeedback, LexicalResourceFeedback, RubricScores,
    TaskAchievementFeedback, TaskAchievementSuggestions, VocabularyCorrection,
    GRAMMAR_MISTAKES_GOAL, LINKING_WORDS_GOAL, MAX_BAND, WORD_REPETITION_GOAL,
};
use crate::llm_client::{strip_json_fences, LlmError};

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("model call failed: {0}")]
    Call(#[from] LlmError),

    #[error("model reply is not valid feedback JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("{field} score {value} is outside 0-9")]
    ScoreOutOfRange { field: &'static str, value: f64 },
}

/// Strips whitespace and code fences, parses, normalises and validates.
pub fn parse_feedback(raw: &str) -> Result<FeedbackResult, UpstreamError> {
    let text = strip_json_fences(raw);
    let feedback: FeedbackResult = serde_json::from_str(text)?;
    let feedback = normalize(feedback);
    validate(&feedback)?;
    Ok(feedback)
}

fn normalize(mut feedback: FeedbackResult) -> FeedbackResult {
    feedback.overall_score = round_to_tenth(feedback.overall_score);

    let rubric = feedback.rubric_scores;
    let sections = [
        (&mut feedback.task_achievement.score, rubric.task_achievement),
        (&mut feedback.coherence_cohesion.score, rubric.coherence_cohesion),
        (&mut feedback.lexical_resource.score, rubric.lexical_resource),
        (
            &mut feedback.grammatical_range_accuracy.score,
            rubric.grammatical_range_accuracy,
        ),
    ];
    for (section_score, rubric_score) in sections {
        if section_score.is_none() {
            *section_score = Some(rubric_score);
        }
    }

    let stats = &mut feedback.statistics;
    stats.linking_words_goal = LINKING_WORDS_GOAL;
    stats.word_repetition_goal = WORD_REPETITION_GOAL;
    stats.grammar_mistakes_goal = GRAMMAR_MISTAKES_GOAL;

    feedback
}

fn validate(feedback: &FeedbackResult) -> Result<(), UpstreamError> {
    check_band("overall", feedback.overall_score)?;
    for (field, value) in feedback.rubric_scores.entries() {
        check_band(field, value)?;
    }

    let section_scores = [
        ("task_achievement section", feedback.task_achievement.score),
        ("coherence_cohesion section", feedback.coherence_cohesion.score),
        ("lexical_resource section", feedback.lexical_resource.score),
        (
            "grammatical_range_accuracy section",
            feedback.grammatical_range_accuracy.score,
        ),
    ];
    for (field, value) in section_scores {
        if let Some(value) = value {
            check_band(field, value)?;
        }
    }
    Ok(())
}

fn check_band(field: &'static str, value: f64) -> Result<(), UpstreamError> {
    if (0.0..=MAX_BAND).contains(&value) {
        Ok(())
    } else {
        Err(UpstreamError::ScoreOutOfRange { field, value })
    }
}

pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// The canned result served whenever the model call or its parsing fails.
pub fn fallback_feedback() -> FeedbackResult {
    FeedbackResult {
        overall_score: 6.0,
        overall_feedback: "The essay addresses the topic with some relevant points, but there are areas for improvement in task response, coherence, vocabulary, and grammar.".to_string(),
        rubric_scores: RubricScores::uniform(6.0),
        statistics: EssayStatistics {
            linking_words_count: 3,
            linking_words_goal: LINKING_WORDS_GOAL,
            word_repetition_count: 5,
            word_repetition_goal: WORD_REPETITION_GOAL,
            grammar_mistakes_count: 2,
            grammar_mistakes_goal: GRAMMAR_MISTAKES_GOAL,
        },
        task_achievement: TaskAchievementFeedback {
            score: Some(6.0),
            strengths: strings(&[
                "Addresses both advantages and disadvantages",
                "Provides some reasoning",
            ]),
            areas_for_improvement: strings(&[
                "Needs deeper exploration",
                "Points could be more developed",
            ]),
            improvement_suggestions: TaskAchievementSuggestions {
                how_to_address_prompt: "Ensure you fully explore each advantage and disadvantage with detailed explanations.".to_string(),
                how_to_develop_ideas: "Use specific examples to support your arguments.".to_string(),
                how_to_stay_on_topic: "Always relate your points back to the main topic.".to_string(),
                contextual_development: "Start with a clear thesis and summarize main points in conclusion.".to_string(),
                better_format: "Use traditional essay structure: introduction, body paragraphs, conclusion.".to_string(),
                text_structure: "Organize ideas logically within paragraphs.".to_string(),
            },
        },
        coherence_cohesion: CoherenceCohesionFeedback {
            score: Some(6.0),
            strengths: strings(&[
                "Clear introduction and conclusion",
                "Some use of linking words",
            ]),
            areas_for_improvement: strings(&[
                "Lacks clear topic sentences",
                "Ideas could be better sequenced",
            ]),
            improvement_suggestions: CoherenceCohesionSuggestions {
                logical_organization: "Organize ideas in a structured manner with logical sequence.".to_string(),
                thematic_organization: "Each paragraph should have a clear topic sentence.".to_string(),
                logical_sequencing: "Ensure each paragraph flows logically from one point to the next.".to_string(),
                referencing_substitution: "Use pronouns and referencing words effectively.".to_string(),
                discourse_markers: "Use more varied linking words and phrases.".to_string(),
            },
        },
        lexical_resource: LexicalResourceFeedback {
            score: Some(6.0),
            strengths: strings(&["Adequate vocabulary range"]),
            areas_for_improvement: strings(&["Limited vocabulary variety", "Some spelling errors"]),
            vocabulary_improvements: vec![VocabularyCorrection {
                incorrect: "In the social point of view".to_string(),
                correct: "From a social perspective".to_string(),
                explanation: "介词的语法错误：应使用 'From a social perspective' 而不是 'In the social point of view'。'From a social perspective' 是更准确和自然的表达方式。".to_string(),
                error_type: "介词错误".to_string(),
            }],
        },
        grammatical_range_accuracy: GrammaticalRangeFeedback {
            score: Some(6.0),
            strengths: strings(&["Generally clear meaning"]),
            areas_for_improvement: strings(&["Some grammatical errors", "Inconsistent tenses"]),
            grammar_corrections: vec![GrammarCorrection {
                incorrect: "We are making him to try hard".to_string(),
                correct: "We encourage them to try hard".to_string(),
                explanation: "及物动词使用错误：不需要使用'making him to'，可以直接用'encourage them to'。同时代词单复数错误：应该用 'them' 而不是 'the child'，因为在之前的句子中提到了'children'。".to_string(),
                error_type: "及物动词错误、代词单复数错误".to_string(),
                sentence_context: "We are making him to try hard in his studies.".to_string(),
            }],
        },
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

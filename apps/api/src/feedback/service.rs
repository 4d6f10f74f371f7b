//! One upstream call per request; callers decide what to do with the error.

use tracing::debug;

use crate::feedback::models::FeedbackResult;
use crate::feedback::parser::{parse_feedback, UpstreamError};
use crate::feedback::prompts::{build_chat_prompt, build_feedback_prompt, CHAT_PARAMS, REVIEW_PARAMS};
use crate::llm_client::{LanguageModel, LlmError};

/// Grades an essay. Makes exactly one model call; no retry.
pub async fn review_essay(
    llm: &dyn LanguageModel,
    topic: &str,
    essay: &str,
) -> Result<FeedbackResult, UpstreamError> {
    let prompt = build_feedback_prompt(topic, essay);
    let raw = llm.complete(&prompt, REVIEW_PARAMS).await?;
    debug!("Model reply: {} characters", raw.len());
    parse_feedback(&raw)
}

/// Answers a follow-up question using earlier feedback as context.
pub async fn answer_question(
    llm: &dyn LanguageModel,
    context: &str,
    question: &str,
) -> Result<String, LlmError> {
    let prompt = build_chat_prompt(context, question);
    llm.complete(&prompt, CHAT_PARAMS).await
}

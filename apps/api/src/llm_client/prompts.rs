// Cross-cutting prompt fragments shared by every module that talks to the model.
// Each feature keeps its own prompts.rs alongside it.

/// Closing instruction that enforces JSON-only output.
pub const JSON_ONLY_INSTRUCTION: &str = "请确保返回的是有效的JSON格式，不要包含任何其他文本。";

/// Persona line for every IELTS writing prompt.
pub const EXAMINER_PERSONA: &str =
    "你是一位专业的雅思写作评分专家。请对以下雅思作文进行详细分析，并按照雅思官方评分标准给出反馈。";

/// Persona line for the follow-up tutoring chat.
pub const TUTOR_PERSONA: &str = "你是一位专业的雅思写作导师。";

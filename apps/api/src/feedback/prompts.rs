// All model prompts for essay review and the tutoring chat.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{EXAMINER_PERSONA, JSON_ONLY_INSTRUCTION, TUTOR_PERSONA};
use crate::llm_client::GenerationParams;

pub const REVIEW_PARAMS: GenerationParams = GenerationParams {
    max_tokens: 4000,
    temperature: 0.7,
};

pub const CHAT_PARAMS: GenerationParams = GenerationParams {
    max_tokens: 1000,
    temperature: 0.7,
};

/// Essay review prompt. Replace: {persona}, {topic}, {essay}, {json_only}
const REVIEW_PROMPT_TEMPLATE: &str = r#"{persona}

题目: {topic}

作文内容:
{essay}

请按照雅思官方四项评分标准进行评分，并按照以下JSON格式返回分析结果，使用中文回复：

{
    "overall_score": 分数(0-9，保留一位小数),
    "overall_feedback": "总体反馈",
    "rubric_scores": {
        "task_achievement": 分数(0-9),
        "coherence_cohesion": 分数(0-9),
        "lexical_resource": 分数(0-9),
        "grammatical_range_accuracy": 分数(0-9)
    },
    "statistics": {
        "linking_words_count": 连词数量,
        "linking_words_goal": 7,
        "word_repetition_count": 重复词汇数量,
        "word_repetition_goal": 3,
        "grammar_mistakes_count": 语法错误数量,
        "grammar_mistakes_goal": 0
    },
    "task_achievement": {
        "score": 分数(0-9),
        "strengths": ["优势1", "优势2"],
        "areas_for_improvement": ["改进点1", "改进点2"],
        "improvement_suggestions": {
            "how_to_address_prompt": "如何完整回应题目",
            "how_to_develop_ideas": "如何展开观点",
            "how_to_stay_on_topic": "如何点题",
            "contextual_development": "上下文展开建议",
            "better_format": "更优的格式建议",
            "text_structure": "行文结构建议"
        }
    },
    "coherence_cohesion": {
        "score": 分数(0-9),
        "strengths": ["优势1", "优势2"],
        "areas_for_improvement": ["改进点1", "改进点2"],
        "improvement_suggestions": {
            "logical_organization": "逻辑组织建议",
            "thematic_organization": "主题组织建议",
            "logical_sequencing": "逻辑衔接顺序建议",
            "referencing_substitution": "引用替换建议",
            "discourse_markers": "标志性逻辑提示词建议"
        }
    },
    "lexical_resource": {
        "score": 分数(0-9),
        "strengths": ["优势1", "优势2"],
        "areas_for_improvement": ["改进点1", "改进点2"],
        "vocabulary_improvements": [
            {
                "incorrect": "错误表达",
                "correct": "正确表达",
                "explanation": "详细解释错误原因和正确用法",
                "error_type": "错误类型（如：介词错误、代词错误等）"
            }
        ]
    },
    "grammatical_range_accuracy": {
        "score": 分数(0-9),
        "strengths": ["优势1", "优势2"],
        "areas_for_improvement": ["改进点1", "改进点2"],
        "grammar_corrections": [
            {
                "incorrect": "错误语法",
                "correct": "正确语法",
                "explanation": "详细解释语法错误原因和正确用法",
                "error_type": "错误类型（如：时态错误、主谓一致错误等）",
                "sentence_context": "包含错误的完整句子"
            }
        ]
    }
}

评分标准说明：
1. Task Achievement (任务完成度): 是否完全回应题目要求，观点是否清晰，论证是否充分
2. Coherence and Cohesion (连贯与衔接): 文章结构是否清晰，段落间连接是否自然，逻辑是否连贯
3. Lexical Resource (词汇资源): 词汇使用是否准确、多样，是否适合学术写作
4. Grammatical Range and Accuracy (语法范围和准确性): 语法结构是否多样，语法错误是否影响理解

请特别注意：
1. 严格按照雅思官方评分标准进行评分，每项给出0-9分的具体分数
2. 在grammar_corrections和vocabulary_improvements中，请提供具体的错误分析
3. 在statistics中统计连词数量、重复词汇数量和语法错误数量
4. 对于每个错误，请提供包含该错误的完整句子作为上下文
5. 错误解释要具体，如："介词的语法错误：应使用 'From a social perspective' 而不是 'In the social point of view'"

{json_only}"#;

/// Tutoring chat prompt. Replace: {persona}, {context}, {question}
const CHAT_PROMPT_TEMPLATE: &str = r#"{persona}基于之前的反馈上下文：

{context}

学生的问题: {question}

请提供一个有帮助的、鼓励性的中文回复，回答学生的具体问题并帮助他们提高写作水平。保持回复简洁实用。"#;

/// Renders the review prompt. Topic and essay are embedded verbatim, unvalidated.
pub fn build_feedback_prompt(topic: &str, essay: &str) -> String {
    let template = REVIEW_PROMPT_TEMPLATE
        .replace("{persona}", EXAMINER_PERSONA)
        .replace("{json_only}", JSON_ONLY_INSTRUCTION);
    fill_in_order(&template, ("{topic}", topic), ("{essay}", essay))
}

/// Renders the tutoring prompt with prior feedback as context.
pub fn build_chat_prompt(context: &str, question: &str) -> String {
    let template = CHAT_PROMPT_TEMPLATE.replace("{persona}", TUTOR_PERSONA);
    fill_in_order(&template, ("{context}", context), ("{question}", question))
}

/// Substitutes two user-supplied slots, `first` appearing before `second` in the
/// template, without rescanning inserted text for placeholders.
fn fill_in_order(template: &str, first: (&str, &str), second: (&str, &str)) -> String {
    let (head, tail) = template.split_once(second.0).unwrap_or((template, ""));
    let (before, after) = head.split_once(first.0).unwrap_or((head, ""));
    let mut out = String::with_capacity(template.len() + first.1.len() + second.1.len());
    out.push_str(before);
    out.push_str(first.1);
    out.push_str(after);
    out.push_str(second.1);
    out.push_str(tail);
    out
}

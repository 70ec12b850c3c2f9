//! 提示词构建 - 业务能力层
//!
//! 纯字符串格式化，无副作用。第二阶段和直出模式的提示词都要求同一个 JSON 结构
//! `{question, options[4], correct_answer, explanation}`，解析器正是按这个结构提取的。

use serde_json::json;

use crate::models::{AnswerLetter, RawCandidate};

/// 第一阶段模型微调时使用的固定指令
pub const RAW_INSTRUCTION: &str = "Generate an IB Physics Paper 1 style multiple-choice question.";

/// 第二阶段精修的系统消息
pub const REFINEMENT_SYSTEM_MESSAGE: &str = "You are an expert IB Physics teacher. Refine physics questions for accuracy and clarity. Always respond with valid JSON.";

/// 直出模式的系统消息
pub const DIRECT_SYSTEM_MESSAGE: &str = "You are an expert IB Physics teacher who creates high-quality multiple-choice questions. Always respond with valid JSON format.";

const JSON_SCHEMA_EXAMPLE: &str = r#"{
    "question": "The main question text here...",
    "options": ["Option A text", "Option B text", "Option C text", "Option D text"],
    "correct_answer": "A",
    "explanation": "Brief explanation of why this answer is correct"
}"#;

/// 第一阶段的指令载荷：`{"instruction", "input", "output"}`，output 为空
pub fn build_raw_prompt(_topic: &str, topic_name: &str) -> String {
    json!({
        "instruction": RAW_INSTRUCTION,
        "input": format!("Topic: {}", topic_name),
        "output": ""
    })
    .to_string()
}

/// 第二阶段：把第一阶段候选交给大模型修正
pub fn build_refinement_prompt(candidate: &RawCandidate, topic_name: &str) -> String {
    let options = AnswerLetter::ALL
        .iter()
        .zip(candidate.options.iter())
        .map(|(letter, text)| format!("{}) {}", letter, text))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Please review and refine this IB Physics multiple-choice question for accuracy and quality:

TOPIC: {topic_name}
QUESTION: {question}

OPTIONS:
{options}

SUGGESTED ANSWER: {answer}

Please improve the question by:
1. Ensuring physics accuracy and proper units
2. Making the question clearer and more precise
3. Ensuring all options are plausible but only one is correct
4. Following IB Physics standards

Respond with the improved question in this exact JSON format:
{schema}"#,
        topic_name = topic_name,
        question = candidate.question,
        options = options,
        answer = candidate.correct_answer,
        schema = JSON_SCHEMA_EXAMPLE,
    )
}

/// 单阶段：直接让大模型出题
pub fn build_direct_prompt(_topic: &str, topic_name: &str, topic_context: &str) -> String {
    format!(
        r#"Generate a high-quality IB Physics multiple-choice question about {topic_name}.

Topic Context: {topic_context}

Requirements:
1. Create a clear, well-structured question appropriate for IB Physics students
2. Include exactly 4 multiple-choice options (A, B, C, D)
3. Make one option clearly correct and the others plausible but wrong
4. Use proper physics terminology and units
5. Include relevant calculations or conceptual reasoning
6. Make the question challenging but fair for IB level

Format your response as valid JSON with this exact structure:
{schema}

Topic: {topic_name}
Generate the question now:"#,
        topic_name = topic_name,
        topic_context = topic_context,
        schema = JSON_SCHEMA_EXAMPLE,
    )
}

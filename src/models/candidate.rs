//! 候选题目
//!
//! 解析器的输出，尚未校验。解析失败时直接返回 `None`，不存在"半填充"的候选。

use serde::{Deserialize, Serialize};

/// 第一阶段文本默认的置信度
pub const RAW_CONFIDENCE: f32 = 0.8;

/// 校验器看到的候选字段
pub trait Candidate {
    fn question(&self) -> &str;
    fn options(&self) -> &[String];
    fn correct_answer(&self) -> &str;
}

/// 第一阶段候选
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub confidence: f32,
}

/// 第二阶段候选，JSON 键与提示词中要求的格式一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinedCandidate {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Candidate for RawCandidate {
    fn question(&self) -> &str {
        &self.question
    }

    fn options(&self) -> &[String] {
        &self.options
    }

    fn correct_answer(&self) -> &str {
        &self.correct_answer
    }
}

impl Candidate for RefinedCandidate {
    fn question(&self) -> &str {
        &self.question
    }

    fn options(&self) -> &[String] {
        &self.options
    }

    fn correct_answer(&self) -> &str {
        &self.correct_answer
    }
}

impl From<RawCandidate> for RefinedCandidate {
    /// 回退时把第一阶段结果当作最终候选（没有解析）
    fn from(raw: RawCandidate) -> Self {
        Self {
            question: raw.question,
            options: raw.options,
            correct_answer: raw.correct_answer,
            explanation: None,
        }
    }
}

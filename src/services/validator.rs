//! 候选题目校验 - 业务能力层
//!
//! 两个阶段使用同一套规则，保证阶段之间的结构约定一致。

use crate::models::{AnswerLetter, Candidate};

/// 拒绝原因
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("题干为空")]
    MissingQuestionText,
    #[error("选项数量应为 4，实际为 {0}")]
    WrongOptionCount(usize),
    #[error("答案字母无效: '{0}'")]
    InvalidAnswerLetter(String),
    #[error("选项 {0} 为空")]
    EmptyOption(char),
}

/// 校验候选的结构约定
///
/// 检查顺序：题干 → 选项数量 → 答案字母 → 空选项
pub fn validate(candidate: &dyn Candidate) -> Result<(), RejectReason> {
    if candidate.question().trim().is_empty() {
        return Err(RejectReason::MissingQuestionText);
    }

    let options = candidate.options();
    if options.len() != 4 {
        return Err(RejectReason::WrongOptionCount(options.len()));
    }

    if AnswerLetter::parse(candidate.correct_answer()).is_none() {
        return Err(RejectReason::InvalidAnswerLetter(
            candidate.correct_answer().to_string(),
        ));
    }

    for (letter, option) in AnswerLetter::ALL.iter().zip(options) {
        if option.trim().is_empty() {
            return Err(RejectReason::EmptyOption(letter.as_char()));
        }
    }

    Ok(())
}

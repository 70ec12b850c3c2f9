use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// 正确答案字母
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerLetter {
    A,
    B,
    C,
    D,
}

impl AnswerLetter {
    pub const ALL: [AnswerLetter; 4] = [
        AnswerLetter::A,
        AnswerLetter::B,
        AnswerLetter::C,
        AnswerLetter::D,
    ];

    /// 对应选项的下标（0-based）
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_char(self) -> char {
        match self {
            AnswerLetter::A => 'A',
            AnswerLetter::B => 'B',
            AnswerLetter::C => 'C',
            AnswerLetter::D => 'D',
        }
    }

    /// 只接受单个大写字母 A-D（允许首尾空白）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "A" => Some(AnswerLetter::A),
            "B" => Some(AnswerLetter::B),
            "C" => Some(AnswerLetter::C),
            "D" => Some(AnswerLetter::D),
            _ => None,
        }
    }
}

impl std::fmt::Display for AnswerLetter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// 难度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Standard,
    Hard,
}

impl Difficulty {
    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Standard => "standard",
            Difficulty::Hard => "hard",
        }
    }

    /// 不区分大小写
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "standard" => Some(Difficulty::Standard),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 最终生成的题目
///
/// 创建后不再修改；`options` 固定 4 个，内部存储不带 "A) " 前缀。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub topic: String,
    pub question_text: String,
    pub options: [String; 4],
    pub correct_answer: AnswerLetter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub processing_time_ms: u64,
    pub generated_at: DateTime<Local>,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl Question {
    /// 带字母前缀的选项，用于展示
    pub fn labelled_options(&self) -> Vec<String> {
        AnswerLetter::ALL
            .iter()
            .zip(self.options.iter())
            .map(|(letter, text)| format!("{}) {}", letter, text))
            .collect()
    }

    pub fn correct_option(&self) -> &str {
        &self.options[self.correct_answer.index()]
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.question_text)?;
        for line in self.labelled_options() {
            writeln!(f, "{}", line)?;
        }
        write!(f, "答案: {}", self.correct_answer)?;
        if let Some(explanation) = &self.explanation {
            write!(f, "\n解析: {}", explanation)?;
        }
        Ok(())
    }
}

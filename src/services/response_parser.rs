//! 响应解析 - 业务能力层
//!
//! 把模型输出的自由文本转换为结构化候选。两种解析都是"全有或全无"：
//! 任何必需部分缺失都返回 `None`，不会返回半填充的对象。

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::models::candidate::RAW_CONFIDENCE;
use crate::models::{AnswerLetter, RawCandidate, RefinedCandidate};

static OPTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ABCD]\)").expect("option line pattern"));

/// 前缀之后第一个不与其他字母相连的 A-D（数字、下划线、标点都算分隔）
static ANSWER_LETTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^A-Z])([ABCD])(?:[^A-Z]|$)").expect("answer letter pattern")
});

const ANSWER_PREFIXES: [&str; 2] = ["ANSWER:", "CORRECT:"];

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Question,
    Options,
}

/// 解析第一阶段的纯文本输出
///
/// 语法（逐行，忽略空行）：
/// - `A)`..`D)` 开头的行进入选项区，去掉字母标签后按顺序保存
/// - `ANSWER:` / `CORRECT:` 开头（不区分大小写）的行设置答案
/// - 其余行在进入选项区之前拼接为题干
pub fn parse_raw_text(text: &str) -> Option<RawCandidate> {
    let mut question = String::new();
    let mut options = Vec::new();
    let mut answer: Option<AnswerLetter> = None;
    let mut section = Section::Question;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if OPTION_LINE.is_match(line) {
            section = Section::Options;
            // 标签固定为两个 ASCII 字符
            options.push(line[2..].trim().to_string());
        } else if let Some(rest) = answer_remainder(line) {
            if let Some(letter) = ANSWER_LETTER
                .captures(&rest)
                .and_then(|c| c.get(1))
                .and_then(|m| AnswerLetter::parse(m.as_str()))
            {
                answer = Some(letter);
            }
        } else if section == Section::Question {
            if !question.is_empty() {
                question.push(' ');
            }
            question.push_str(line);
        }
    }

    match answer {
        Some(letter) if !question.is_empty() && options.len() == 4 => Some(RawCandidate {
            question,
            options,
            correct_answer: letter.to_string(),
            confidence: RAW_CONFIDENCE,
        }),
        _ => {
            debug!(
                "第一阶段文本不完整: 题干 {} 字符, 选项 {} 个, 答案 {:?}",
                question.len(),
                options.len(),
                answer
            );
            None
        }
    }
}

/// 答案行去掉前缀后的剩余部分（已转大写）
fn answer_remainder(line: &str) -> Option<String> {
    let upper = line.to_uppercase();
    ANSWER_PREFIXES
        .iter()
        .find_map(|prefix| upper.strip_prefix(prefix))
        .map(str::to_string)
}

/// 解析第二阶段的 JSON 输出
///
/// 取第一个 `{` 到最后一个 `}` 之间的内容解码，容忍模型在 JSON 前后附带的说明文字。
pub fn parse_json_text(text: &str) -> Option<RefinedCandidate> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }

    let mut candidate: RefinedCandidate = match serde_json::from_str(&text[start..=end]) {
        Ok(candidate) => candidate,
        Err(e) => {
            debug!("JSON 解码失败: {}", e);
            return None;
        }
    };

    if candidate.options.len() != 4 {
        return None;
    }
    let letter = AnswerLetter::parse(&candidate.correct_answer)?;
    candidate.correct_answer = letter.to_string();

    Some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VELOCITY: &str =
        "What is velocity?\nA) Speed\nB) Speed with direction\nC) Acceleration\nD) Force\nANSWER: B";

    #[test]
    fn test_parse_raw_scenario() {
        let candidate = parse_raw_text(VELOCITY).unwrap();
        assert_eq!(candidate.question, "What is velocity?");
        assert_eq!(
            candidate.options,
            vec!["Speed", "Speed with direction", "Acceleration", "Force"]
        );
        assert_eq!(candidate.correct_answer, "B");
        assert!((0.0..=1.0).contains(&candidate.confidence));
    }

    #[test]
    fn test_parse_raw_every_answer_letter() {
        for letter in AnswerLetter::ALL {
            for prefix in ["ANSWER:", "answer:", "Correct:"] {
                let text = format!(
                    "A ball is thrown upward.\nWhat is its acceleration at the top?\n\nA) 0\nB) g\nC) 2g\nD) g/2\n{} {}",
                    prefix, letter
                );
                let candidate = parse_raw_text(&text).unwrap();
                assert_eq!(candidate.options.len(), 4);
                assert_eq!(candidate.correct_answer, letter.to_string());
                assert_eq!(
                    candidate.question,
                    "A ball is thrown upward. What is its acceleration at the top?"
                );
            }
        }
    }

    #[test]
    fn test_parse_raw_answer_prefix_letters_are_ignored() {
        let text = "Q?\nA) w\nB) x\nC) y\nD) z\nCorrect: the answer is (d)";
        assert_eq!(parse_raw_text(text).unwrap().correct_answer, "D");
    }

    #[test]
    fn test_parse_raw_answer_letter_with_suffix_or_label() {
        let with_digit = "Q?\nA) w\nB) x\nC) y\nD) z\nAnswer: B2";
        assert_eq!(parse_raw_text(with_digit).unwrap().correct_answer, "B");

        let labelled = "Q?\nA) w\nB) x\nC) y\nD) z\nANSWER: Option_B";
        assert_eq!(parse_raw_text(labelled).unwrap().correct_answer, "B");

        let word_only = "Q?\nA) w\nB) x\nC) y\nD) z\nANSWER: cab";
        assert!(parse_raw_text(word_only).is_none());
    }

    #[test]
    fn test_parse_raw_missing_answer() {
        let text = "What is velocity?\nA) Speed\nB) Speed with direction\nC) Acceleration\nD) Force";
        assert!(parse_raw_text(text).is_none());
    }

    #[test]
    fn test_parse_raw_wrong_option_count() {
        let three = "Q?\nA) w\nB) x\nC) y\nANSWER: A";
        let five = "Q?\nA) w\nB) x\nC) y\nD) z\nA) again\nANSWER: A";
        assert!(parse_raw_text(three).is_none());
        assert!(parse_raw_text(five).is_none());
    }

    #[test]
    fn test_parse_raw_missing_question() {
        assert!(parse_raw_text("A) w\nB) x\nC) y\nD) z\nANSWER: A").is_none());
        assert!(parse_raw_text("").is_none());
    }

    #[test]
    fn test_parse_raw_ignores_text_after_options() {
        let text = format!("{}\nThis trailing commentary is not part of the stem.", VELOCITY);
        assert_eq!(parse_raw_text(&text).unwrap().question, "What is velocity?");
    }

    #[test]
    fn test_parse_json_scenario_with_prose() {
        let text = r#"Here you go: {"question":"Q","options":["a","b","c","d"],"correct_answer":"C","explanation":"E"}"#;
        let candidate = parse_json_text(text).unwrap();
        assert_eq!(
            candidate,
            RefinedCandidate {
                question: "Q".to_string(),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_answer: "C".to_string(),
                explanation: Some("E".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_json_round_trip() {
        let candidate = RefinedCandidate {
            question: "A 2 kg mass accelerates at 3 m/s². What is the net force?".to_string(),
            options: vec!["1.5 N".into(), "5 N".into(), "6 N".into(), "9 N".into()],
            correct_answer: "C".to_string(),
            explanation: Some("F = ma = 6 N".to_string()),
        };
        let encoded = serde_json::to_string_pretty(&candidate).unwrap();
        assert_eq!(parse_json_text(&encoded), Some(candidate.clone()));

        let wrapped = format!("```json\n{}\n```\nLet me know if you need more.", encoded);
        assert_eq!(parse_json_text(&wrapped), Some(candidate));
    }

    #[test]
    fn test_parse_json_rejections() {
        let missing_answer = r#"{"question":"Q","options":["a","b","c","d"]}"#;
        let answer_e = r#"{"question":"Q","options":["a","b","c","d"],"correct_answer":"E"}"#;
        let three = r#"{"question":"Q","options":["a","b","c"],"correct_answer":"A"}"#;
        let five = r#"{"question":"Q","options":["a","b","c","d","e"],"correct_answer":"A"}"#;
        let missing_question = r#"{"options":["a","b","c","d"],"correct_answer":"A"}"#;

        for text in [missing_answer, answer_e, three, five, missing_question] {
            assert!(parse_json_text(text).is_none(), "{}", text);
        }
    }

    #[test]
    fn test_parse_json_garbage() {
        assert!(parse_json_text("no json here").is_none());
        assert!(parse_json_text("} backwards {").is_none());
        assert!(parse_json_text("{not: valid}").is_none());
    }

    #[test]
    fn test_parse_json_without_explanation() {
        let text = r#"{"question":"Q","options":["a","b","c","d"],"correct_answer":"A"}"#;
        assert_eq!(parse_json_text(text).unwrap().explanation, None);
    }
}

//! 会话内的题目历史
//!
//! 只保存在内存中，由调用方持有；跨线程共享时调用方自行加锁。

use std::collections::BTreeMap;

use super::question::Question;

#[derive(Debug, Default, Clone)]
pub struct QuestionHistory {
    questions: Vec<Question>,
}

impl QuestionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, question: Question) {
        self.questions.push(question);
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// 最近的 n 道题，最新的在前
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &Question> {
        self.questions.iter().rev().take(n)
    }

    pub fn average_processing_ms(&self) -> Option<u64> {
        if self.questions.is_empty() {
            return None;
        }
        let total: u64 = self.questions.iter().map(|q| q.processing_time_ms).sum();
        Some(total / self.questions.len() as u64)
    }

    /// 按话题 id 计数
    pub fn count_by_topic(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for question in &self.questions {
            *counts.entry(question.topic.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

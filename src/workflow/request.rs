//! 生成请求上下文
//!
//! 封装"为哪个话题、什么难度出题"这一信息

use std::fmt::Display;

use tracing::warn;

use crate::error::{AppResult, GenerationError};
use crate::models::{Difficulty, Topic};

/// 单次生成的请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationRequest {
    /// 话题（已在目录中确认存在）
    pub topic: Topic,
    /// 难度
    pub difficulty: Difficulty,
}

impl GenerationRequest {
    /// 创建请求，未知话题直接拒绝
    pub fn new(topic_id: &str, difficulty: Difficulty) -> Result<Self, GenerationError> {
        let topic = Topic::find(topic_id)
            .ok_or_else(|| GenerationError::UnknownTopic(topic_id.to_string()))?;
        Ok(Self { topic, difficulty })
    }

    /// 解析 `topic[:difficulty]` 形式的参数
    pub fn parse(arg: &str) -> Result<Self, GenerationError> {
        let (topic_id, difficulty) = match arg.split_once(':') {
            Some((topic_id, level)) => {
                let difficulty = Difficulty::parse(level).unwrap_or_else(|| {
                    warn!("未知难度 '{}'，使用默认难度", level);
                    Difficulty::default()
                });
                (topic_id, difficulty)
            }
            None => (arg, Difficulty::default()),
        };
        Self::new(topic_id, difficulty)
    }

    /// 解析命令行参数列表；没有参数时使用 `default_topic`
    pub fn parse_args(args: &[String], default_topic: &str) -> AppResult<Vec<Self>> {
        if args.is_empty() {
            return Ok(vec![Self::parse(default_topic)?]);
        }
        let requests = args
            .iter()
            .map(|arg| Self::parse(arg))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(requests)
    }
}

impl Display for GenerationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[话题 {} | 难度 {}]", self.topic.id, self.difficulty)
    }
}

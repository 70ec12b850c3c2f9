//! 进度状态机
//!
//! 每次运行各自持有一个 `ProgressTracker`，不存在进程级的"当前进度"。

use serde::Serialize;
use tracing::info;

/// 流水线阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    Idle,
    Generating,
    Refining,
    Validating,
    Complete,
    Error,
}

impl PipelineStage {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Generating => "generating",
            PipelineStage::Refining => "refining",
            PipelineStage::Validating => "validating",
            PipelineStage::Complete => "complete",
            PipelineStage::Error => "error",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStage::Complete | PipelineStage::Error)
    }

    /// 进入该阶段时的完成百分比；`Error` 保留上一个值
    pub fn percent(self) -> Option<u8> {
        match self {
            PipelineStage::Idle => Some(0),
            PipelineStage::Generating => Some(25),
            PipelineStage::Refining => Some(60),
            PipelineStage::Validating => Some(85),
            PipelineStage::Complete => Some(100),
            PipelineStage::Error => None,
        }
    }

    /// 只允许向前迁移；单阶段模式从 Generating 直接进入 Validating
    pub fn can_transition_to(self, next: PipelineStage) -> bool {
        use PipelineStage::*;
        match (self, next) {
            (Complete | Error, _) => false,
            (_, Error) => true,
            (Idle, Generating) => true,
            (Generating, Refining | Validating) => true,
            (Refining, Validating) => true,
            (Validating, Complete) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("非法的阶段迁移: {from} → {to}")]
pub struct InvalidTransition {
    pub from: PipelineStage,
    pub to: PipelineStage,
}

/// 某一时刻的进度
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub stage: PipelineStage,
    pub percent: u8,
    pub message: String,
}

/// 单次运行的进度状态机
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    stage: PipelineStage,
    percent: u8,
    message: String,
    advisories: Vec<String>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self {
            stage: PipelineStage::Idle,
            percent: 0,
            message: "Ready to generate questions".to_string(),
            advisories: Vec::new(),
        }
    }
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn advance(
        &mut self,
        next: PipelineStage,
        message: impl Into<String>,
    ) -> Result<ProgressSnapshot, InvalidTransition> {
        if !self.stage.can_transition_to(next) {
            return Err(InvalidTransition {
                from: self.stage,
                to: next,
            });
        }
        self.stage = next;
        if let Some(percent) = next.percent() {
            self.percent = percent;
        }
        self.message = message.into();
        Ok(self.snapshot())
    }

    pub fn fail(
        &mut self,
        message: impl Into<String>,
    ) -> Result<ProgressSnapshot, InvalidTransition> {
        self.advance(PipelineStage::Error, message)
    }

    /// 记录非致命提示（例如精修失败后的回退）
    pub fn advise(&mut self, note: impl Into<String>) {
        self.advisories.push(note.into());
    }

    pub fn advisories(&self) -> &[String] {
        &self.advisories
    }

    pub fn into_advisories(self) -> Vec<String> {
        self.advisories
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            stage: self.stage,
            percent: self.percent,
            message: self.message.clone(),
        }
    }
}

/// 进度观察者，由调用方（UI、日志等）实现
pub trait ProgressObserver: Send + Sync {
    fn on_stage(&self, snapshot: &ProgressSnapshot);

    fn on_advisory(&self, _note: &str) {}
}

/// 不需要进度时使用
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_stage(&self, _snapshot: &ProgressSnapshot) {}
}

/// 把进度写入日志
pub struct LoggingProgress;

impl ProgressObserver for LoggingProgress {
    fn on_stage(&self, snapshot: &ProgressSnapshot) {
        info!(
            "📊 [{:>3}%] {} - {}",
            snapshot.percent, snapshot.stage, snapshot.message
        );
    }

    fn on_advisory(&self, note: &str) {
        info!("💡 {}", note);
    }
}

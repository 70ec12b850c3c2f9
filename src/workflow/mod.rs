//! 流程层（Workflow Layer）
//!
//! 定义"一道题"从请求到成品的完整流程，以及每次运行独立持有的进度状态。

pub mod pipeline;
pub mod progress;
pub mod request;

pub use pipeline::{PipelineMode, QuestionPipeline, RefinementOutcome, RunReport};
pub use progress::{
    InvalidTransition, LoggingProgress, NoProgress, PipelineStage, ProgressObserver,
    ProgressSnapshot, ProgressTracker,
};
pub use request::GenerationRequest;

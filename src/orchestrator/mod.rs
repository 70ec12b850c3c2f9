//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! batch_runner (处理 Vec<GenerationRequest>)
//!     ↓
//! workflow::QuestionPipeline (处理单个请求)
//!     ↓
//! services (能力层：提示词 / 解析 / 校验)
//!     ↓
//! clients (远程模型调用)
//! ```
//!
//! 编排层只做调度和统计，不做具体业务判断。

pub mod batch_runner;

pub use batch_runner::{BatchRunner, BatchSummary};

//! # Physics Question Gen
//!
//! 两阶段 IB 物理选择题生成流水线
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 远程模型调用，失败在边界处归类为类型化错误
//! - `RawGenerationClient` - 第一阶段微调模型端点
//! - `RefinementClient` - 第二阶段 OpenAI 兼容的对话模型
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 纯函数：提示词构造、响应解析、结构校验
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一道题"的完整生成流程
//! - `GenerationRequest` - 请求上下文（话题 + 难度）
//! - `QuestionPipeline` - 状态机编排（生成 → 精修/回退 → 校验 → 完成）
//! - `ProgressTracker` - 每次运行独立的进度
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_runner` - 并发执行多个请求
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, EndpointConfig};
pub use error::{AppError, AppResult, GenerationError};
pub use models::{Difficulty, Question, QuestionHistory, Topic};
pub use orchestrator::{BatchRunner, BatchSummary};
pub use workflow::{
    GenerationRequest, NoProgress, PipelineMode, PipelineStage, ProgressObserver, QuestionPipeline,
    RunReport,
};

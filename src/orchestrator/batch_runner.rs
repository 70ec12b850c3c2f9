//! 批量出题 - 编排层
//!
//! ## 职责
//!
//! 并发执行一组 `GenerationRequest`，每个请求都是一次完全独立的流水线运行。
//!
//! ## 设计特点
//!
//! - **并发控制**：Semaphore 限制同时进行的运行数
//! - **共享流水线**：`QuestionPipeline` 无运行状态，通过 `Arc` 在任务间共享
//! - **结果有序**：报告顺序与请求顺序一致

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::workflow::{
    GenerationRequest, ProgressObserver, QuestionPipeline, RefinementOutcome, RunReport,
};

/// 批量运行结果
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// 每个请求对应的报告（任务崩溃的请求没有报告）
    pub reports: Vec<(GenerationRequest, RunReport)>,
    pub success: usize,
    pub failed: usize,
    /// 成功但回退到第一阶段结果的数量
    pub fallbacks: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.success + self.failed
    }
}

/// 批量运行器
pub struct BatchRunner {
    pipeline: Arc<QuestionPipeline>,
    max_concurrent: usize,
}

impl BatchRunner {
    pub fn new(pipeline: Arc<QuestionPipeline>, max_concurrent: usize) -> Self {
        Self {
            pipeline,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub async fn run(
        &self,
        requests: Vec<GenerationRequest>,
        observer: Arc<dyn ProgressObserver>,
    ) -> BatchSummary {
        info!(
            "📋 共 {} 个出题请求，最大并发 {}",
            requests.len(),
            self.max_concurrent
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut handles = Vec::with_capacity(requests.len());

        for (idx, request) in requests.into_iter().enumerate() {
            let semaphore = semaphore.clone();
            let pipeline = self.pipeline.clone();
            let observer = observer.clone();

            let handle = tokio::spawn(async move {
                // 信号量从不关闭，acquire 只会在关闭时失败
                let _permit = semaphore.acquire_owned().await.ok();
                pipeline.generate(&request, observer.as_ref()).await
            });
            handles.push((idx + 1, request, handle));
        }

        let mut summary = BatchSummary::default();

        for (index, request, handle) in handles {
            match handle.await {
                Ok(report) => {
                    if report.is_success() {
                        summary.success += 1;
                        if report.refinement == RefinementOutcome::FellBack {
                            summary.fallbacks += 1;
                        }
                    } else {
                        summary.failed += 1;
                    }
                    summary.reports.push((request, report));
                }
                Err(e) => {
                    error!("[请求 {}] {} 任务执行失败: {}", index, request, e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

//! 出题流水线 - 流程层
//!
//! 核心职责：定义"一道题"的完整生成流程
//!
//! 两阶段流程：
//! 1. 第一阶段微调模型出原始题（失败即终止）
//! 2. 第二阶段大模型精修（失败则回退到第一阶段结果）
//! 3. 组装最终题目
//!
//! 单阶段流程是同一状态机的退化形式：直接调用第二阶段模型出题，
//! 从不进入 Refining。

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use futures::FutureExt;
use serde::Deserialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::clients::{CompletionClient, RawGenerationClient, RefinementClient};
use crate::config::{Config, EndpointConfig};
use crate::error::GenerationError;
use crate::models::{AnswerLetter, Question, RawCandidate, RefinedCandidate, Topic};
use crate::services::prompt_builder::{
    build_direct_prompt, build_raw_prompt, build_refinement_prompt,
};
use crate::services::validator::RejectReason;
use crate::services::{parse_json_text, parse_raw_text, validate};
use crate::utils::logging::truncate_text;
use crate::workflow::progress::{
    PipelineStage, ProgressObserver, ProgressSnapshot, ProgressTracker,
};
use crate::workflow::request::GenerationRequest;

/// 流水线模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum PipelineMode {
    /// 微调模型 + 大模型精修
    #[default]
    #[serde(rename = "two-stage")]
    TwoStage,
    /// 只用大模型直接出题
    #[serde(rename = "direct", alias = "direct-only")]
    DirectOnly,
}

impl PipelineMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "two-stage" | "two_stage" | "twostage" => Some(PipelineMode::TwoStage),
            "direct" | "direct-only" | "direct_only" => Some(PipelineMode::DirectOnly),
            _ => None,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PipelineMode::TwoStage => "two-stage pipeline (fine-tuned model + refinement)",
            PipelineMode::DirectOnly => "direct generation",
        }
    }
}

/// 精修阶段的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefinementOutcome {
    /// 精修成功，采用第二阶段结果
    Refined,
    /// 精修失败或未配置，采用第一阶段结果
    FellBack,
    /// 单阶段模式，没有精修
    Skipped,
}

/// 单次运行的报告
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: Result<Question, GenerationError>,
    /// 最终进度
    pub progress: ProgressSnapshot,
    /// 非致命提示
    pub advisories: Vec<String>,
    pub refinement: RefinementOutcome,
    /// 第一阶段候选（单阶段模式或第一阶段失败时为空）
    pub raw_candidate: Option<RawCandidate>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn question(&self) -> Option<&Question> {
        self.outcome.as_ref().ok()
    }
}

/// 单次运行的状态，不跨运行共享
struct PipelineRun<'a> {
    request: &'a GenerationRequest,
    observer: &'a dyn ProgressObserver,
    tracker: ProgressTracker,
    started: Instant,
    raw_candidate: Option<RawCandidate>,
    refinement: RefinementOutcome,
}

impl<'a> PipelineRun<'a> {
    fn new(request: &'a GenerationRequest, observer: &'a dyn ProgressObserver) -> Self {
        Self {
            request,
            observer,
            tracker: ProgressTracker::new(),
            started: Instant::now(),
            raw_candidate: None,
            refinement: RefinementOutcome::Skipped,
        }
    }

    fn advance(
        &mut self,
        stage: PipelineStage,
        message: impl Into<String>,
    ) -> Result<(), GenerationError> {
        let snapshot = self
            .tracker
            .advance(stage, message)
            .map_err(|e| GenerationError::Internal(e.to_string()))?;
        info!("{} {}", self.request, snapshot.message);
        self.observer.on_stage(&snapshot);
        Ok(())
    }

    fn advise(&mut self, note: String) {
        warn!("{} ⚠️ {}", self.request, note);
        self.observer.on_advisory(&note);
        self.tracker.advise(note);
    }

    fn fail(&mut self, err: &GenerationError) {
        error!("{} ❌ {}", self.request, err);
        match self.tracker.fail(format!("Error: {}", err)) {
            Ok(snapshot) => self.observer.on_stage(&snapshot),
            Err(e) => warn!("{} 无法进入错误状态: {}", self.request, e),
        }
    }

    fn into_report(self, outcome: Result<Question, GenerationError>) -> RunReport {
        let progress = self.tracker.snapshot();
        RunReport {
            outcome,
            progress,
            advisories: self.tracker.into_advisories(),
            refinement: self.refinement,
            raw_candidate: self.raw_candidate,
        }
    }
}

/// 出题流水线
///
/// - 不持有任何运行状态，可在多个并发运行间共享
/// - 客户端通过 `CompletionClient` 注入
pub struct QuestionPipeline {
    raw_client: Arc<dyn CompletionClient>,
    chat_client: Arc<dyn CompletionClient>,
    stage1: EndpointConfig,
    stage2: EndpointConfig,
    mode: PipelineMode,
}

impl QuestionPipeline {
    /// 按配置创建真实客户端
    pub fn new(config: &Config) -> Self {
        let chat_client: Arc<dyn CompletionClient> = match config.pipeline_mode {
            PipelineMode::TwoStage => Arc::new(RefinementClient::new(&config.stage2_model)),
            PipelineMode::DirectOnly => Arc::new(RefinementClient::direct(&config.stage2_model)),
        };

        Self::with_clients(
            Arc::new(RawGenerationClient::new()),
            chat_client,
            config.stage1_endpoint(),
            config.stage2_endpoint(),
            config.pipeline_mode,
        )
    }

    pub fn with_clients(
        raw_client: Arc<dyn CompletionClient>,
        chat_client: Arc<dyn CompletionClient>,
        stage1: EndpointConfig,
        stage2: EndpointConfig,
        mode: PipelineMode,
    ) -> Self {
        Self {
            raw_client,
            chat_client,
            stage1,
            stage2,
            mode,
        }
    }

    pub fn mode(&self) -> PipelineMode {
        self.mode
    }

    /// 生成一道题
    ///
    /// 所有失败（包括编排内部的 panic）都转换为报告中的错误，不会向外抛出。
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        observer: &dyn ProgressObserver,
    ) -> RunReport {
        let mut run = PipelineRun::new(request, observer);

        let outcome = AssertUnwindSafe(self.run_stages(&mut run))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(GenerationError::Internal(panic_message(payload))));

        if let Err(e) = &outcome {
            run.fail(e);
        }

        run.into_report(outcome)
    }

    async fn run_stages(&self, run: &mut PipelineRun<'_>) -> Result<Question, GenerationError> {
        let topic = run.request.topic;

        let candidate = match self.mode {
            PipelineMode::TwoStage => {
                run.started = Instant::now();
                run.advance(
                    PipelineStage::Generating,
                    format!("🚀 Generating question with fine-tuned model: {}", topic.name),
                )?;
                let raw = self.generate_raw(&topic).await?;
                run.raw_candidate = Some(raw.clone());

                run.advance(PipelineStage::Refining, "✨ Refining question for accuracy...")?;
                self.refine_or_fall_back(run, raw, &topic).await
            }
            PipelineMode::DirectOnly => {
                if self.stage2.auth_token.is_none() {
                    return Err(GenerationError::MissingCredential("stage2_api_key"));
                }
                run.started = Instant::now();
                run.advance(
                    PipelineStage::Generating,
                    format!("🚀 Generating question directly: {}", topic.name),
                )?;
                let candidate = self.generate_direct(&topic).await?;
                run.refinement = RefinementOutcome::Skipped;
                candidate
            }
        };

        run.advance(
            PipelineStage::Validating,
            "🔍 Validating physics accuracy and IB compliance...",
        )?;
        let question = assemble(run.request, candidate, run.started)?;

        run.advance(
            PipelineStage::Complete,
            format!(
                "✅ Generated in {:.1}s using {}",
                question.processing_time_ms as f64 / 1000.0,
                self.mode.description()
            ),
        )?;
        Ok(question)
    }

    /// 第一阶段：调用 + 解析 + 校验，任何一步失败都是终止性错误
    async fn generate_raw(&self, topic: &Topic) -> Result<RawCandidate, GenerationError> {
        let prompt = build_raw_prompt(topic.id, topic.name);
        let text = self.raw_client.invoke(&prompt, &self.stage1).await?;
        debug!("第一阶段文本: {}", truncate_text(&text, 300));

        let candidate = parse_raw_text(&text).ok_or_else(|| GenerationError::UnparsableResponse {
            stage: "stage-1",
            preview: truncate_text(&text, 120),
        })?;
        validate(&candidate)?;
        Ok(candidate)
    }

    async fn refine_or_fall_back(
        &self,
        run: &mut PipelineRun<'_>,
        raw: RawCandidate,
        topic: &Topic,
    ) -> RefinedCandidate {
        if self.stage2.auth_token.is_none() {
            run.refinement = RefinementOutcome::FellBack;
            run.advise("no refinement key configured, using stage-1 question".to_string());
            return raw.into();
        }

        match self.refine(&raw, topic).await {
            Ok(refined) => {
                run.refinement = RefinementOutcome::Refined;
                refined
            }
            Err(e) => {
                run.refinement = RefinementOutcome::FellBack;
                run.advise(format!("refinement failed: {}", e));
                raw.into()
            }
        }
    }

    async fn refine(
        &self,
        raw: &RawCandidate,
        topic: &Topic,
    ) -> Result<RefinedCandidate, GenerationError> {
        let prompt = build_refinement_prompt(raw, topic.name);
        let text = self.chat_client.invoke(&prompt, &self.stage2).await?;
        parse_checked(&text, "stage-2")
    }

    async fn generate_direct(&self, topic: &Topic) -> Result<RefinedCandidate, GenerationError> {
        let prompt = build_direct_prompt(topic.id, topic.name, topic.context());
        let text = self.chat_client.invoke(&prompt, &self.stage2).await?;
        parse_checked(&text, "direct")
    }
}

fn parse_checked(text: &str, stage: &'static str) -> Result<RefinedCandidate, GenerationError> {
    let candidate = parse_json_text(text).ok_or_else(|| GenerationError::UnparsableResponse {
        stage,
        preview: truncate_text(text, 120),
    })?;
    validate(&candidate)?;
    Ok(candidate)
}

/// 组装最终题目并记录耗时
fn assemble(
    request: &GenerationRequest,
    candidate: RefinedCandidate,
    started: Instant,
) -> Result<Question, GenerationError> {
    let correct_answer = AnswerLetter::parse(&candidate.correct_answer)
        .ok_or_else(|| RejectReason::InvalidAnswerLetter(candidate.correct_answer.clone()))?;
    let option_count = candidate.options.len();
    let options: [String; 4] = candidate
        .options
        .try_into()
        .map_err(|_| RejectReason::WrongOptionCount(option_count))?;

    Ok(Question {
        id: Uuid::new_v4().to_string(),
        topic: request.topic.id.to_string(),
        question_text: candidate.question,
        options,
        correct_answer,
        explanation: candidate.explanation,
        processing_time_ms: started.elapsed().as_millis() as u64,
        generated_at: Local::now(),
        difficulty: request.difficulty,
    })
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .map(|msg| format!("编排过程发生 panic: {}", msg))
        .unwrap_or_else(|| "编排过程发生未知 panic".to_string())
}

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use physics_question_gen::models::Theme;
use physics_question_gen::utils::logging::{log_startup, print_final_stats};
use physics_question_gen::workflow::LoggingProgress;
use physics_question_gen::{
    logger, BatchRunner, Config, GenerationRequest, QuestionHistory, QuestionPipeline,
};

/// 未指定话题时使用
const DEFAULT_TOPIC: &str = "kinematics";

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load().await?;

    // 初始化日志
    logger::init(config.verbose_logging);

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--list-topics") {
        print_topics();
        return Ok(());
    }

    log_startup(&config);

    // 参数形如 `topic[:difficulty]`
    let requests = GenerationRequest::parse_args(&args, DEFAULT_TOPIC)?;

    let pipeline = Arc::new(QuestionPipeline::new(&config));
    let runner = BatchRunner::new(pipeline, config.max_concurrent_runs);
    let summary = runner.run(requests, Arc::new(LoggingProgress)).await;

    let mut history = QuestionHistory::new();
    for (request, report) in &summary.reports {
        match &report.outcome {
            Ok(question) => {
                println!("\n{}", question);
                for note in &report.advisories {
                    info!("{} 💡 {}", request, note);
                }
                history.record(question.clone());
            }
            Err(e) => error!("{} ❌ 生成失败: {}", request, e),
        }
    }

    print_final_stats(&summary, &history);

    Ok(())
}

fn print_topics() {
    for theme in Theme::ALL {
        println!("{}", theme);
        for id in theme.topic_ids() {
            if let Some(topic) = physics_question_gen::Topic::find(id) {
                println!("  {:<32} {}", topic.id, topic.name);
            }
        }
    }
}

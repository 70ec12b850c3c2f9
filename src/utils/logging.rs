/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

use crate::config::Config;
use crate::models::QuestionHistory;
use crate::orchestrator::BatchSummary;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - IB 物理选择题生成");
    info!("🧭 流水线模式: {}", config.pipeline_mode.description());
    info!("🔗 第一阶段端点: {}", config.stage1_url);
    info!(
        "🔗 第二阶段模型: {} ({})",
        config.stage2_model,
        if config.stage2_api_key.is_some() {
            "已配置密钥"
        } else {
            "未配置密钥"
        }
    );
    info!("📊 最大并发数: {}", config.max_concurrent_runs);
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(summary: &BatchSummary, history: &QuestionHistory) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", summary.success, summary.total());
    info!("↩️ 回退到第一阶段: {}", summary.fallbacks);
    info!("❌ 失败: {}", summary.failed);

    if let Some(avg) = history.average_processing_ms() {
        info!("⏱️ 平均耗时: {:.1}s", avg as f64 / 1000.0);
    }
    for (topic, count) in history.count_by_topic() {
        info!("   {}: {} 题", topic, count);
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("速度与加速度", 2), "速度...");
    }
}

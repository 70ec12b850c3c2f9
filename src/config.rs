//! 程序配置
//!
//! 优先级：默认值 < TOML 文件（`QUESTION_GEN_CONFIG`） < 环境变量

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::workflow::PipelineMode;

/// 单个远程端点的调用配置
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointConfig {
    /// 目标地址
    pub url: String,
    /// Bearer 凭证（可选）
    pub auth_token: Option<String>,
    /// 请求超时（毫秒）
    pub timeout_ms: u64,
}

impl EndpointConfig {
    pub fn new(url: impl Into<String>, auth_token: Option<String>, timeout_ms: u64) -> Self {
        Self {
            url: url.into(),
            auth_token,
            timeout_ms,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 第一阶段（微调小模型）---
    pub stage1_url: String,
    pub stage1_token: Option<String>,
    pub stage1_timeout_ms: u64,
    // --- 第二阶段（OpenAI 兼容接口）---
    pub stage2_api_key: Option<String>,
    pub stage2_base_url: String,
    pub stage2_model: String,
    pub stage2_timeout_ms: u64,
    /// 流水线模式
    pub pipeline_mode: PipelineMode,
    /// 同时运行的生成任务数量
    pub max_concurrent_runs: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stage1_url: "http://localhost:8000/predict".to_string(),
            stage1_token: None,
            stage1_timeout_ms: 30_000,
            stage2_api_key: None,
            stage2_base_url: "https://openrouter.ai/api/v1".to_string(),
            stage2_model: "deepseek/deepseek-v3".to_string(),
            stage2_timeout_ms: 60_000,
            pipeline_mode: PipelineMode::TwoStage,
            max_concurrent_runs: 4,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 加载配置：先读 `QUESTION_GEN_CONFIG` 指向的 TOML 文件（如有），再叠加环境变量
    pub async fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var("QUESTION_GEN_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::from_toml_file(Path::new(&path)).await?,
            _ => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    /// 只从环境变量读取
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件读取，缺失的键使用默认值
    pub async fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::ReadFailed {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(content)?;
        Ok(config.normalized())
    }

    /// 用环境变量覆盖当前配置
    pub fn with_env_overrides(self) -> Self {
        Self::overlay(self, |key| std::env::var(key).ok())
    }

    fn overlay(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let config = Self {
            stage1_url: lookup("STAGE1_URL").unwrap_or(self.stage1_url),
            stage1_token: lookup("STAGE1_TOKEN").or(self.stage1_token),
            stage1_timeout_ms: parse_value(lookup("STAGE1_TIMEOUT_MS"))
                .unwrap_or(self.stage1_timeout_ms),
            stage2_api_key: lookup("STAGE2_API_KEY")
                .or_else(|| lookup("OPENROUTER_API_KEY"))
                .or(self.stage2_api_key),
            stage2_base_url: lookup("STAGE2_BASE_URL").unwrap_or(self.stage2_base_url),
            stage2_model: lookup("STAGE2_MODEL").unwrap_or(self.stage2_model),
            stage2_timeout_ms: parse_value(lookup("STAGE2_TIMEOUT_MS"))
                .unwrap_or(self.stage2_timeout_ms),
            pipeline_mode: lookup("PIPELINE_MODE")
                .and_then(|v| PipelineMode::parse(&v))
                .unwrap_or(self.pipeline_mode),
            max_concurrent_runs: parse_value(lookup("MAX_CONCURRENT_RUNS"))
                .unwrap_or(self.max_concurrent_runs),
            verbose_logging: parse_value(lookup("VERBOSE_LOGGING")).unwrap_or(self.verbose_logging),
        };
        config.normalized()
    }

    /// 空字符串的凭证视为未配置
    fn normalized(mut self) -> Self {
        self.stage1_token = self.stage1_token.filter(|t| !t.trim().is_empty());
        self.stage2_api_key = self.stage2_api_key.filter(|k| !k.trim().is_empty());
        self.max_concurrent_runs = self.max_concurrent_runs.max(1);
        self
    }

    pub fn stage1_endpoint(&self) -> EndpointConfig {
        EndpointConfig::new(
            self.stage1_url.clone(),
            self.stage1_token.clone(),
            self.stage1_timeout_ms,
        )
    }

    pub fn stage2_endpoint(&self) -> EndpointConfig {
        EndpointConfig::new(
            self.stage2_base_url.clone(),
            self.stage2_api_key.clone(),
            self.stage2_timeout_ms,
        )
    }
}

/// 解析环境变量值，格式不对时视为未设置
fn parse_value<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

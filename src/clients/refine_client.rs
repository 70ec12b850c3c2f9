//! 第二阶段客户端
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（OpenRouter 等），端点地址和密钥来自 `EndpointConfig`
//! - 关闭 async-openai 自带的 429/5xx 重试，每次调用只发一个请求

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::time::Duration;
use tracing::{debug, warn};

use super::CompletionClient;
use crate::config::EndpointConfig;
use crate::error::GenerationError;
use crate::services::prompt_builder::{DIRECT_SYSTEM_MESSAGE, REFINEMENT_SYSTEM_MESSAGE};

/// 第二阶段客户端
#[derive(Debug, Clone)]
pub struct RefinementClient {
    model: String,
    system_message: &'static str,
    max_tokens: u32,
    temperature: f32,
}

impl RefinementClient {
    /// 精修用途：低温度，要求严格 JSON
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_message: REFINEMENT_SYSTEM_MESSAGE,
            max_tokens: 800,
            temperature: 0.3,
        }
    }

    /// 直出用途：单阶段流水线里直接出题
    pub fn direct(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_message: DIRECT_SYSTEM_MESSAGE,
            max_tokens: 1000,
            temperature: 0.7,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, prompt: &str, endpoint: &EndpointConfig) -> Result<String, OpenAIError> {
        let openai_config = OpenAIConfig::new()
            .with_api_key(endpoint.auth_token.clone().unwrap_or_default())
            .with_api_base(&endpoint.url);
        let client = Client::with_config(openai_config).with_backoff(no_retry());

        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(self.system_message)
                    .build()?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()?,
            ),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()?;

        let response = client.chat().create(request).await?;

        Ok(response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl CompletionClient for RefinementClient {
    async fn invoke(
        &self,
        prompt: &str,
        endpoint: &EndpointConfig,
    ) -> Result<String, GenerationError> {
        debug!("调用第二阶段模型: {} @ {}", self.model, endpoint.url);

        let content = tokio::time::timeout(endpoint.timeout(), self.chat(prompt, endpoint))
            .await
            .map_err(|_| {
                GenerationError::unreachable(
                    endpoint.url.as_str(),
                    format!("请求超时 ({} ms)", endpoint.timeout_ms),
                )
            })?
            .map_err(|e| {
                warn!("第二阶段 API 调用失败: {}", e);
                openai_error(&endpoint.url, e)
            })?;

        if content.trim().is_empty() {
            return Err(GenerationError::remote(
                endpoint.url.as_str(),
                None,
                format!("模型 {} 返回内容为空", self.model),
            ));
        }

        debug!("第二阶段 API 调用成功");
        Ok(content.trim().to_string())
    }
}

/// 最长重试时间为零：第一次失败后不再重试
fn no_retry() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

/// async-openai 的 `ApiError` 不携带 HTTP 状态码，只能保留错误信息
fn openai_error(endpoint: &str, err: OpenAIError) -> GenerationError {
    match err {
        OpenAIError::Reqwest(e) => GenerationError::unreachable(endpoint, e),
        OpenAIError::ApiError(api) => GenerationError::remote(endpoint, None, api.to_string()),
        other => GenerationError::remote(endpoint, None, other.to_string()),
    }
}

//! 第一阶段客户端
//!
//! 调用微调小模型的推理端点。端点可能把文本包在不同字段里，
//! 归一化按 `RESPONSE_EXTRACTORS` 的顺序依次尝试。

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::CompletionClient;
use crate::config::EndpointConfig;
use crate::error::GenerationError;
use crate::utils::logging::truncate_text;

type Extractor = fn(&Value) -> Option<String>;

/// 响应字段提取策略，按顺序尝试
const RESPONSE_EXTRACTORS: &[(&str, Extractor)] = &[
    ("generated_text", extract_generated_text),
    ("output", extract_output),
    ("response", extract_response),
];

#[derive(Debug, Serialize)]
struct GenerationPayload<'a> {
    inputs: &'a str,
    max_new_tokens: u32,
    temperature: f32,
    top_p: f32,
}

/// 第一阶段客户端
#[derive(Debug, Clone, Default)]
pub struct RawGenerationClient {
    http: reqwest::Client,
}

impl RawGenerationClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompletionClient for RawGenerationClient {
    async fn invoke(
        &self,
        prompt: &str,
        endpoint: &EndpointConfig,
    ) -> Result<String, GenerationError> {
        let payload = GenerationPayload {
            inputs: prompt,
            max_new_tokens: 500,
            temperature: 0.7,
            top_p: 0.9,
        };

        debug!("调用第一阶段端点: {} (提示词 {} 字符)", endpoint.url, prompt.len());

        let mut request = self
            .http
            .post(&endpoint.url)
            .timeout(endpoint.timeout())
            .json(&payload);
        if let Some(token) = &endpoint.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(&endpoint.url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(&endpoint.url, e))?;

        if !status.is_success() {
            warn!("第一阶段端点返回 {}: {}", status, truncate_text(&body, 200));
            return Err(GenerationError::remote(
                endpoint.url.as_str(),
                Some(status.as_u16()),
                truncate_text(&body, 500),
            ));
        }

        debug!("第一阶段原始响应: {}", truncate_text(&body, 500));
        Ok(normalize_response(&body))
    }
}

fn transport_error(endpoint: &str, err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::unreachable(endpoint, format!("请求超时: {}", err))
    } else if err.is_connect() {
        GenerationError::unreachable(endpoint, format!("连接失败: {}", err))
    } else {
        GenerationError::unreachable(endpoint, err)
    }
}

/// 把响应体归一化为模型生成的文本
///
/// 依次尝试各提取策略；都不适用时，JSON 字符串返回其内容，其余情况原样返回。
pub fn normalize_response(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };

    for (field, extractor) in RESPONSE_EXTRACTORS {
        if let Some(text) = extractor(&value) {
            debug!("响应文本取自字段 `{}`", field);
            return text;
        }
    }

    match value {
        Value::String(text) => text,
        _ => body.to_string(),
    }
}

/// 读取字符串字段；也接受 `[{...}]` 形式，取第一个元素
fn string_field(value: &Value, field: &str) -> Option<String> {
    let object = match value {
        Value::Array(items) => items.first()?,
        other => other,
    };
    object.get(field)?.as_str().map(str::to_string)
}

fn extract_generated_text(value: &Value) -> Option<String> {
    string_field(value, "generated_text")
}

fn extract_output(value: &Value) -> Option<String> {
    string_field(value, "output")
}

fn extract_response(value: &Value) -> Option<String> {
    let response = string_field(value, "response")?;

    // 整个 response 本身是 JSON 时取其中的 output
    if let Ok(inner) = serde_json::from_str::<Value>(&response) {
        return Some(extract_output(&inner).unwrap_or(response));
    }

    Some(embedded_json_trailer(&response).unwrap_or(response))
}

/// 嵌入 JSON 后跟生成文本：`{...} 生成的文本`
///
/// 只有开头能完整解码出一个 JSON 对象时才取其后的文本
fn embedded_json_trailer(text: &str) -> Option<String> {
    let text = text.trim_start();
    if !text.starts_with('{') {
        return None;
    }

    let mut stream = serde_json::Deserializer::from_str(text).into_iter::<Value>();
    stream.next()?.ok()?;
    let trailing = text[stream.byte_offset()..].trim();
    (!trailing.is_empty()).then(|| trailing.to_string())
}

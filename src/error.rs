use thiserror::Error;

use crate::services::validator::RejectReason;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 题目生成流水线错误
    #[error("生成错误: {0}")]
    Generation(#[from] GenerationError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 题目生成错误
///
/// 远程调用、解析、校验的失败都会在边界处转换成这里的某一种，
/// 流水线不会让任何传输或解析异常穿透出去。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    /// 连接失败或超时
    #[error("无法连接到 {endpoint}: {message}")]
    Unreachable { endpoint: String, message: String },

    /// 远端返回非 2xx 状态
    #[error("远端返回错误 ({endpoint}): status={status:?}, message={message}")]
    RemoteError {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },

    /// 响应可以解码，但不符合解析语法
    #[error("{stage} 响应无法解析: {preview}")]
    UnparsableResponse { stage: &'static str, preview: String },

    /// 解析成功但结构不合法
    #[error("校验未通过: {0}")]
    ValidationRejected(RejectReason),

    /// 话题不在目录中
    #[error("未知话题: {0}")]
    UnknownTopic(String),

    /// 缺少必需的凭证
    #[error("缺少凭证: {0}")]
    MissingCredential(&'static str),

    /// 编排自身的意外错误
    #[error("内部错误: {0}")]
    Internal(String),
}

impl GenerationError {
    /// 创建连接失败错误
    pub fn unreachable(endpoint: impl Into<String>, message: impl ToString) -> Self {
        GenerationError::Unreachable {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    /// 创建远端错误
    pub fn remote(
        endpoint: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        GenerationError::RemoteError {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
        }
    }

    /// 是否为传输层错误（连接/超时/状态码）
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            GenerationError::Unreachable { .. } | GenerationError::RemoteError { .. }
        )
    }
}

impl From<RejectReason> for GenerationError {
    fn from(reason: RejectReason) -> Self {
        GenerationError::ValidationRejected(reason)
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(GenerationError::unreachable("http://x", "timeout").is_transport());
        assert!(GenerationError::remote("http://x", Some(500), "boom").is_transport());
        assert!(
            !GenerationError::ValidationRejected(RejectReason::MissingQuestionText).is_transport()
        );
    }

    #[test]
    fn test_reject_reason_converts() {
        let err: GenerationError = RejectReason::WrongOptionCount(3).into();
        assert_eq!(
            err,
            GenerationError::ValidationRejected(RejectReason::WrongOptionCount(3))
        );
        let app: AppError = err.into();
        assert!(app.to_string().contains("3"));
    }
}

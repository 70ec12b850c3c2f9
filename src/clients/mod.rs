//! 远程模型客户端
//!
//! 每个客户端只做一次网络调用，并在边界处把所有失败归类为
//! `Unreachable`（连接/超时）或 `RemoteError`（非 2xx），不会向上抛出其他异常。

use async_trait::async_trait;

use crate::config::EndpointConfig;
use crate::error::GenerationError;

pub mod raw_client;
pub mod refine_client;

pub use raw_client::RawGenerationClient;
pub use refine_client::RefinementClient;

/// 文本生成客户端
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// 发送提示词，返回模型的文本输出
    async fn invoke(&self, prompt: &str, endpoint: &EndpointConfig)
        -> Result<String, GenerationError>;
}

//! Anthropic Messages API 客户端错误
//!
//! 区分限流（429）、API 返回的错误状态以及网络层失败，
//! 分类器据此决定是否重试。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnthropicError {
    /// HTTP 429，`retry_after_ms` 来自 `retry-after` 头
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// 其他非 2xx 响应（401 密钥无效、5xx 等）
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// DNS、连接拒绝、超时等
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("API key is not configured")]
    MissingApiKey,
}

impl AnthropicError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AnthropicError::RateLimited { .. })
    }
}

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use super::error::AnthropicError;
use super::types::{MessagesRequest, MessagesResponse};
use crate::config::ClassifierConfig;

const ANTHROPIC_VERSION: &str = "2023-06-01";
/// 未给出 retry-after 时的默认等待
const DEFAULT_RETRY_AFTER_MS: u64 = 1000;

pub struct AnthropicClient {
    api_key: String,
    client: Client,
    endpoint: String,
}

impl AnthropicClient {
    pub fn new(config: &ClassifierConfig) -> Result<Self, AnthropicError> {
        Self::with_base_url(
            config.api_key.clone(),
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// `base_url` 形如 `https://api.anthropic.com/v1`，测试时指向 mock server
    pub fn with_base_url(
        api_key: String,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, AnthropicError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            api_key,
            client,
            endpoint: format!("{}/messages", base_url.trim_end_matches('/')),
        })
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub async fn send_message(
        &self,
        req: &MessagesRequest,
    ) -> Result<MessagesResponse, AnthropicError> {
        if !self.has_api_key() {
            return Err(AnthropicError::MissingApiKey);
        }

        debug!("POST {} (model {})", self.endpoint, req.model);
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(req)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_ms = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(|secs| secs.saturating_mul(1000))
                .unwrap_or(DEFAULT_RETRY_AFTER_MS);
            return Err(AnthropicError::RateLimited { retry_after_ms });
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(AnthropicError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<MessagesResponse>().await?)
    }
}

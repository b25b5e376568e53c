//! 外部 AI 服务：语音转写与 lean 分类

pub mod anthropic;
pub mod classifier;
pub mod transcription;

use std::fmt;

pub use classifier::LeanClassifier;
pub use transcription::{AudioPayload, Transcriber, WhisperTranscriber};

/// 外部服务的健康状态（只看配置，不发网络请求）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderHealth {
    Healthy,
    Error(String),
}

impl ProviderHealth {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ProviderHealth::Healthy)
    }
}

impl fmt::Display for ProviderHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderHealth::Healthy => write!(f, "healthy"),
            ProviderHealth::Error(reason) => write!(f, "error: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_health_display() {
        assert_eq!(ProviderHealth::Healthy.to_string(), "healthy");
        assert_eq!(
            ProviderHealth::Error("API key is not configured".into()).to_string(),
            "error: API key is not configured"
        );
    }
}

//! Lean 分类
//!
//! 把转写文本交给 Claude，解析出摘要、浪费类别、建议级别和理由。
//! `analyze` 从不失败：任何问题都降级为需要人工复核的 fallback 结果。

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info, warn};

use super::ProviderHealth;
use super::anthropic::{AnthropicClient, AnthropicError, MessagesRequest};
use crate::config::ClassifierConfig;
use crate::domain::{Analysis, LeanCategory, SubmissionMetadata, SuggestionLevel};
use crate::errors::{KaizenError, Result};

/// 429 后单次重试的最长等待
const MAX_RETRY_WAIT: Duration = Duration::from_secs(30);
const NOT_SPECIFIED: &str = "Not specified";

pub struct LeanClassifier {
    client: AnthropicClient,
    model: String,
    max_tokens: u32,
    max_retry_wait: Duration,
}

impl LeanClassifier {
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        let client = AnthropicClient::new(config)
            .map_err(|e| KaizenError::config(format!("Failed to build classifier client: {}", e)))?;
        Ok(Self::from_client(client, &config.model, config.max_tokens))
    }

    pub fn from_client(client: AnthropicClient, model: &str, max_tokens: u32) -> Self {
        Self {
            client,
            model: model.to_string(),
            max_tokens,
            max_retry_wait: MAX_RETRY_WAIT,
        }
    }

    pub fn with_max_retry_wait(mut self, wait: Duration) -> Self {
        self.max_retry_wait = wait;
        self
    }

    pub fn name(&self) -> &str {
        &self.model
    }

    pub fn health(&self) -> ProviderHealth {
        if self.client.has_api_key() {
            ProviderHealth::Healthy
        } else {
            ProviderHealth::Error(AnthropicError::MissingApiKey.to_string())
        }
    }

    pub async fn analyze(&self, transcript: &str, metadata: &SubmissionMetadata) -> Analysis {
        let prompt = build_prompt(transcript, metadata);

        let text = match self.request(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                if e.is_rate_limited() {
                    warn!("Claude still rate limited after retry, queueing for manual review");
                } else {
                    error!("Claude analysis failed: {}", e);
                }
                return Analysis::fallback(transcript, format!("AI analysis unavailable: {}", e));
            }
        };

        match parse_analysis(&text, transcript) {
            Ok(analysis) => {
                info!("AI analysis completed: {}", analysis.lean_category);
                analysis
            }
            Err(e) => {
                warn!("Model response was not valid analysis JSON: {}", e);
                Analysis::fallback(
                    transcript,
                    format!("AI analysis failed, manual review needed. Error: {}", e),
                )
            }
        }
    }

    /// 发送请求；遇到 429 按 retry-after 等待后重试一次
    async fn request(&self, prompt: &str) -> std::result::Result<String, AnthropicError> {
        let req = MessagesRequest::single_user(&self.model, self.max_tokens, prompt);

        let response = match self.client.send_message(&req).await {
            Err(AnthropicError::RateLimited { retry_after_ms }) => {
                let wait = Duration::from_millis(retry_after_ms).min(self.max_retry_wait);
                warn!("Classifier rate limited, retrying in {:?}", wait);
                tokio::time::sleep(wait).await;
                self.client.send_message(&req).await?
            }
            other => other?,
        };

        Ok(response.first_text().unwrap_or_default().to_string())
    }
}

pub fn build_prompt(transcript: &str, metadata: &SubmissionMetadata) -> String {
    let location = metadata.location.as_deref().unwrap_or(NOT_SPECIFIED);
    let shift = metadata.shift.as_deref().unwrap_or(NOT_SPECIFIED);
    let associate = metadata.associate_name.as_deref().unwrap_or(NOT_SPECIFIED);

    format!(
        r#"Analyze this workplace improvement suggestion transcript and provide a structured analysis.

TRANSCRIPT: "{transcript}"
CONTEXT:
- Location: {location}
- Shift: {shift}
- Associate: {associate}

Please categorize this suggestion according to Lean methodology and provide:
1. A concise summary (2-3 sentences)
2. Primary Lean waste category from: {categories}
3. Suggestion level: "Just Do It" (simple fix), "Needs Review" (requires approval), or "Safety" (safety concern)
4. Brief reasoning for the categorization

Respond ONLY in valid JSON format:
{{
    "summary": "Brief summary of the improvement suggestion",
    "lean_category": "Primary lean waste category",
    "suggestion_level": "Just Do It|Needs Review|Safety",
    "reasoning": "Brief explanation of why this fits the category and level"
}}"#,
        categories = LeanCategory::names().join(", "),
    )
}

/// 返回文本中第一个完整的 `{...}` 对象，跳过字符串里的括号
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    lean_category: Option<String>,
    #[serde(default)]
    suggestion_level: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
}

fn parse_analysis(text: &str, transcript: &str) -> std::result::Result<Analysis, String> {
    let json = extract_json_object(text).ok_or_else(|| {
        if text.trim().is_empty() {
            "empty model response".to_string()
        } else {
            "no JSON object found in model response".to_string()
        }
    })?;
    let raw: RawAnalysis = serde_json::from_str(json).map_err(|e| e.to_string())?;

    let lean_category = match raw.lean_category.as_deref() {
        Some(value) => value.parse().unwrap_or_else(|_| {
            warn!("Unknown lean category {:?}, using Motion", value);
            LeanCategory::default()
        }),
        None => LeanCategory::default(),
    };
    let suggestion_level = match raw.suggestion_level.as_deref() {
        Some(value) => value.parse().unwrap_or_else(|_| {
            warn!("Unknown suggestion level {:?}, using Needs Review", value);
            SuggestionLevel::default()
        }),
        None => SuggestionLevel::default(),
    };

    let summary = raw
        .summary
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| Analysis::fallback(transcript, String::new()).summary);

    Ok(Analysis {
        summary,
        lean_category,
        suggestion_level,
        reasoning: raw.reasoning.unwrap_or_default().trim().to_string(),
    })
}

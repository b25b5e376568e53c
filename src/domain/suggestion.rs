use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LeanCategory, SuggestionLevel, SuggestionStatus};

/// 回退摘要保留的最大字符数
pub const SUMMARY_FALLBACK_CHARS: usize = 200;

/// 生成处理任务 ID：`kaizen_` + 8 位十六进制
pub fn generate_job_id() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("kaizen_{}", &hex[..8])
}

/// 录音附带的上下文信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionMetadata {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub shift: Option<String>,
    #[serde(default)]
    pub associate_name: Option<String>,
}

impl SubmissionMetadata {
    /// Parse the `metadata` form field.
    ///
    /// Each key is read on its own: a non-string or blank value drops only
    /// that key, and anything that isn't a JSON object yields empty metadata.
    /// The upload itself is never rejected for bad metadata.
    pub fn parse_lenient(raw: &str) -> Self {
        let value: serde_json::Value = serde_json::from_str(raw).unwrap_or_default();
        let field = |key: &str| {
            value
                .get(key)
                .and_then(serde_json::Value::as_str)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Self {
            location: field("location"),
            shift: field("shift"),
            associate_name: field("associate_name"),
        }
    }
}

/// AI 分析结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub summary: String,
    pub lean_category: LeanCategory,
    pub suggestion_level: SuggestionLevel,
    pub reasoning: String,
}

impl Analysis {
    /// Analysis used when the language model is unavailable or its answer
    /// can't be used: the transcript itself (truncated) goes up for manual review.
    pub fn fallback(transcript: &str, reason: impl Into<String>) -> Self {
        let summary = if transcript.chars().count() > SUMMARY_FALLBACK_CHARS {
            let head: String = transcript.chars().take(SUMMARY_FALLBACK_CHARS).collect();
            format!("{}...", head)
        } else {
            transcript.to_string()
        };

        Self {
            summary,
            lean_category: LeanCategory::Motion,
            suggestion_level: SuggestionLevel::NeedsReview,
            reasoning: reason.into(),
        }
    }
}

/// 持久化的改善建议
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KaizenSuggestion {
    pub id: String,
    pub job_id: String,
    pub transcript: String,
    pub summary: String,
    pub lean_category: LeanCategory,
    pub suggestion_level: SuggestionLevel,
    pub reasoning: Option<String>,
    pub location: Option<String>,
    pub shift: Option<String>,
    pub associate_name: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub status: SuggestionStatus,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_key: Option<String>,
}

impl KaizenSuggestion {
    /// Build a fresh `pending_review` suggestion from one processing run
    pub fn new(
        job_id: String,
        transcript: String,
        analysis: Analysis,
        metadata: SubmissionMetadata,
        audio_key: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            job_id,
            transcript,
            summary: analysis.summary,
            lean_category: analysis.lean_category,
            suggestion_level: analysis.suggestion_level,
            reasoning: Some(analysis.reasoning),
            location: metadata.location,
            shift: metadata.shift,
            associate_name: metadata.associate_name,
            timestamp: Utc::now(),
            status: SuggestionStatus::PendingReview,
            last_updated: None,
            audio_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_format() {
        let id = generate_job_id();
        assert!(id.starts_with("kaizen_"));
        let suffix = &id["kaizen_".len()..];
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(generate_job_id(), generate_job_id());
    }

    #[test]
    fn test_metadata_invalid_json_is_empty() {
        assert_eq!(
            SubmissionMetadata::parse_lenient("not json"),
            SubmissionMetadata::default()
        );
        assert_eq!(
            SubmissionMetadata::parse_lenient("[1, 2]"),
            SubmissionMetadata::default()
        );
    }

    #[test]
    fn test_metadata_wrong_type_drops_only_that_key() {
        let meta = SubmissionMetadata::parse_lenient(
            r#"{"location": "Line 3", "shift": 2, "associate_name": null}"#,
        );
        assert_eq!(meta.location.as_deref(), Some("Line 3"));
        assert!(meta.shift.is_none());
        assert!(meta.associate_name.is_none());
    }

    #[test]
    fn test_metadata_blank_values_dropped() {
        let meta = SubmissionMetadata::parse_lenient(
            r#"{"location": "Line 3", "shift": "  ", "associate_name": " Sam "}"#,
        );
        assert_eq!(meta.location.as_deref(), Some("Line 3"));
        assert_eq!(meta.shift, None);
        assert_eq!(meta.associate_name.as_deref(), Some("Sam"));
    }

    #[test]
    fn test_fallback_short_transcript_kept_verbatim() {
        let analysis = Analysis::fallback("Move the bins closer", "AI analysis unavailable: x");
        assert_eq!(analysis.summary, "Move the bins closer");
        assert_eq!(analysis.lean_category, LeanCategory::Motion);
        assert_eq!(analysis.suggestion_level, SuggestionLevel::NeedsReview);
        assert_eq!(analysis.reasoning, "AI analysis unavailable: x");
    }

    #[test]
    fn test_fallback_long_transcript_truncated() {
        let transcript = "ä".repeat(250);
        let analysis = Analysis::fallback(&transcript, "r");
        assert_eq!(analysis.summary.chars().count(), SUMMARY_FALLBACK_CHARS + 3);
        assert!(analysis.summary.ends_with("..."));
    }

    #[test]
    fn test_fallback_exactly_limit_not_truncated() {
        let transcript = "a".repeat(SUMMARY_FALLBACK_CHARS);
        let analysis = Analysis::fallback(&transcript, "r");
        assert_eq!(analysis.summary, transcript);
    }

    #[test]
    fn test_new_suggestion_is_pending() {
        let suggestion = KaizenSuggestion::new(
            "kaizen_0000abcd".to_string(),
            "text".to_string(),
            Analysis::fallback("text", "r"),
            SubmissionMetadata::default(),
            None,
        );
        assert_eq!(suggestion.status, SuggestionStatus::PendingReview);
        assert!(suggestion.last_updated.is_none());
        assert_eq!(suggestion.reasoning.as_deref(), Some("r"));
    }
}

//! Suggestion service
//!
//! 录音处理流水线（存档 → 转写 → 分析 → 入库）以及建议的查询和状态流转，
//! HTTP 与 CLI 共用。

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::ai::{AudioPayload, LeanClassifier, Transcriber};
use crate::config::SuggestionsConfig;
use crate::domain::{
    KaizenSuggestion, LeanCategory, SubmissionMetadata, SuggestionLevel, SuggestionStatus,
    generate_job_id,
};
use crate::errors::{KaizenError, Result};
use crate::services::AudioArchive;
use crate::storage::{SeaOrmStorage, SuggestionFilter};

// ============ Request/Response DTOs ============

/// 一次录音提交
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub audio: AudioPayload,
    pub metadata: SubmissionMetadata,
}

/// 处理结果
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingOutcome {
    pub job_id: String,
    pub document_id: String,
    pub transcript: String,
    pub summary: String,
    pub lean_category: LeanCategory,
    pub suggestion_level: SuggestionLevel,
    pub reasoning: String,
}

/// 列表查询参数，原样来自 query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
    pub lean_category: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    pub suggestions: Vec<KaizenSuggestion>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

/// compare-and-set 落空后的最多尝试次数
const MAX_STATUS_ATTEMPTS: usize = 3;

pub struct SuggestionService {
    storage: Arc<SeaOrmStorage>,
    transcriber: Arc<dyn Transcriber>,
    classifier: Arc<LeanClassifier>,
    archive: Arc<AudioArchive>,
    settings: SuggestionsConfig,
}

impl SuggestionService {
    pub fn new(
        storage: Arc<SeaOrmStorage>,
        transcriber: Arc<dyn Transcriber>,
        classifier: Arc<LeanClassifier>,
        archive: Arc<AudioArchive>,
        settings: SuggestionsConfig,
    ) -> Self {
        Self {
            storage,
            transcriber,
            classifier,
            archive,
            settings,
        }
    }

    pub fn storage(&self) -> &Arc<SeaOrmStorage> {
        &self.storage
    }

    pub fn transcriber(&self) -> &dyn Transcriber {
        self.transcriber.as_ref()
    }

    pub fn classifier(&self) -> &LeanClassifier {
        &self.classifier
    }

    pub async fn process_recording(&self, req: SubmissionRequest) -> Result<ProcessingOutcome> {
        if req.audio.file_name.trim().is_empty() {
            return Err(KaizenError::validation("Audio file name is required"));
        }
        if req.audio.is_empty() {
            return Err(KaizenError::validation("Audio file is empty"));
        }

        let job_id = generate_job_id();
        info!(
            "Processing audio job: {} ({} bytes)",
            job_id,
            req.audio.len()
        );

        let audio_key = self.archive.store(&job_id, &req.audio).await;

        let transcript = self
            .transcriber
            .transcribe(&job_id, req.audio)
            .await
            .inspect_err(|e| error!("Transcription failed for {}: {}", job_id, e))?;
        info!(
            "Transcription completed: {} characters",
            transcript.chars().count()
        );

        let analysis = self.classifier.analyze(&transcript, &req.metadata).await;

        let suggestion =
            KaizenSuggestion::new(job_id.clone(), transcript, analysis, req.metadata, audio_key);
        let document_id = self.storage.insert_suggestion(&suggestion).await?;
        info!("Stored in database: {}", document_id);

        Ok(ProcessingOutcome {
            job_id,
            document_id,
            transcript: suggestion.transcript,
            summary: suggestion.summary,
            lean_category: suggestion.lean_category,
            suggestion_level: suggestion.suggestion_level,
            reasoning: suggestion.reasoning.unwrap_or_default(),
        })
    }

    pub async fn list(&self, query: ListQuery) -> Result<ListResponse> {
        let skip = query.skip.unwrap_or(0);
        let limit = query
            .limit
            .unwrap_or(self.settings.default_page_size)
            .clamp(1, self.settings.max_page_size.max(1));

        let filter = SuggestionFilter {
            status: parse_optional(query.status.as_deref())?,
            lean_category: parse_optional(query.lean_category.as_deref())?,
        };

        let total = self.storage.count_suggestions(&filter).await?;
        let suggestions = self.storage.list_suggestions(&filter, skip, limit).await?;

        Ok(ListResponse {
            suggestions,
            total,
            skip,
            limit,
        })
    }

    pub async fn get(&self, id: &str) -> Result<KaizenSuggestion> {
        self.storage
            .get_suggestion(id)
            .await?
            .ok_or_else(|| KaizenError::not_found("Suggestion not found"))
    }

    /// 更新状态，返回提示消息
    ///
    /// 开启流转校验时按读到的状态做 compare-and-set，
    /// 并发修改导致写入落空时重新读取再判断。
    pub async fn update_status(&self, id: &str, raw_status: &str) -> Result<String> {
        let next: SuggestionStatus = raw_status.parse().map_err(KaizenError::validation)?;
        let now = Utc::now();

        if !self.settings.enforce_lifecycle {
            if !self.storage.update_status(id, next, now).await? {
                return Err(KaizenError::not_found("Suggestion not found"));
            }
            return Ok(format!("Status updated to {}", next));
        }

        let mut current = self.get(id).await?.status;
        for _ in 0..MAX_STATUS_ATTEMPTS {
            if !current.can_transition_to(next) {
                return Err(transition_rejected(id, current, next));
            }
            if self.storage.update_status_if(id, current, next, now).await? {
                return Ok(format!("Status updated to {}", next));
            }
            // 记录被删除时 get 返回 NotFound
            current = self.get(id).await?.status;
        }

        Err(transition_rejected(id, current, next))
    }
}

fn transition_rejected(id: &str, current: SuggestionStatus, next: SuggestionStatus) -> KaizenError {
    if current.is_terminal() {
        warn!("Suggestion {} is already {}, rejecting {}", id, current, next);
    } else {
        warn!("Rejected status change {} -> {} for {}", current, next, id);
    }
    KaizenError::invalid_transition(format!(
        "Cannot change status from {} to {}",
        current, next
    ))
}

/// 空字符串视为未设置
fn parse_optional<T>(raw: Option<&str>) -> Result<Option<T>>
where
    T: std::str::FromStr<Err = String>,
{
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => value.parse().map(Some).map_err(KaizenError::validation),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_optional() {
        let none: Option<SuggestionStatus> = parse_optional(Some("  ")).unwrap();
        assert!(none.is_none());

        let status: Option<SuggestionStatus> = parse_optional(Some("approved")).unwrap();
        assert_eq!(status, Some(SuggestionStatus::Approved));

        let err = parse_optional::<LeanCategory>(Some("Talent")).unwrap_err();
        assert_eq!(err.code(), "E005");
    }
}

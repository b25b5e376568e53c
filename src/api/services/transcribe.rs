//! POST /api/transcribe
//!
//! multipart 字段：`audio`（录音文件，必填）、`metadata`（JSON 文本，可选）。

use std::sync::Arc;

use actix_multipart::{Field, Multipart};
use actix_web::{HttpResponse, web};
use bytes::BytesMut;
use futures_util::TryStreamExt;
use serde::Serialize;
use tracing::{debug, error};

use crate::ai::AudioPayload;
use crate::domain::SubmissionMetadata;
use crate::errors::KaizenError;
use crate::services::{ProcessingOutcome, SubmissionRequest, SuggestionService};

const MAX_METADATA_BYTES: usize = 64 * 1024;

/// 单个录音的大小上限
#[derive(Debug, Clone, Copy)]
pub struct UploadLimit(pub usize);

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: ProcessingOutcome,
}

async fn read_field(field: &mut Field, limit: usize, what: &str) -> Result<BytesMut, KaizenError> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| KaizenError::invalid_multipart_data(e.to_string()))?
    {
        if buf.len() + chunk.len() > limit {
            return Err(KaizenError::payload_too_large(format!(
                "{} exceeds the {} byte limit",
                what, limit
            )));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

pub struct TranscribeService;

impl TranscribeService {
    pub async fn transcribe(
        service: web::Data<Arc<SuggestionService>>,
        limit: web::Data<UploadLimit>,
        mut payload: Multipart,
    ) -> Result<HttpResponse, KaizenError> {
        let mut audio: Option<AudioPayload> = None;
        let mut metadata_raw = String::from("{}");

        while let Some(mut field) = payload
            .try_next()
            .await
            .map_err(|e| KaizenError::invalid_multipart_data(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "audio" => {
                    let file_name = field
                        .content_disposition()
                        .and_then(|cd| cd.get_filename())
                        .unwrap_or_default()
                        .to_string();
                    let content_type = field.content_type().map(|m| m.to_string());
                    let bytes = read_field(&mut field, limit.0, "Audio file").await?;

                    let mut payload = AudioPayload::new(bytes.freeze(), file_name);
                    payload.content_type = content_type;
                    audio = Some(payload);
                }
                "metadata" => {
                    let bytes = read_field(&mut field, MAX_METADATA_BYTES, "Metadata").await?;
                    metadata_raw = String::from_utf8_lossy(&bytes).into_owned();
                }
                other => {
                    debug!("Ignoring multipart field '{}'", other);
                    read_field(&mut field, limit.0, "Field").await?;
                }
            }
        }

        let audio = audio.ok_or_else(|| KaizenError::validation("Audio file is required"))?;
        let metadata = SubmissionMetadata::parse_lenient(&metadata_raw);

        let outcome = service
            .process_recording(SubmissionRequest { audio, metadata })
            .await
            .map_err(|e| {
                if e.http_status().is_server_error() {
                    error!("Processing failed: {}", e);
                    e.with_prefix("Processing failed")
                } else {
                    e
                }
            })?;

        Ok(HttpResponse::Ok().json(TranscribeResponse {
            success: true,
            outcome,
        }))
    }
}

//! 语音转写
//!
//! `WhisperTranscriber` 对接 OpenAI 兼容的 `/audio/transcriptions` 接口。

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info};

use super::ProviderHealth;
use crate::config::TranscriptionConfig;
use crate::errors::{KaizenError, Result};

/// 上传的录音
#[derive(Debug, Clone)]
pub struct AudioPayload {
    pub bytes: Bytes,
    pub file_name: String,
    pub content_type: Option<String>,
}

impl AudioPayload {
    pub fn new(bytes: impl Into<Bytes>, file_name: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: file_name.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// 存档用扩展名：先看 content type，再看文件名，默认 webm
    pub fn extension(&self) -> &'static str {
        let from_mime = self.content_type.as_deref().and_then(|ct| {
            let essence = ct.split(';').next().unwrap_or(ct).trim();
            match essence {
                "audio/webm" | "video/webm" => Some("webm"),
                "audio/ogg" | "audio/opus" => Some("ogg"),
                "audio/wav" | "audio/x-wav" | "audio/wave" => Some("wav"),
                "audio/mpeg" | "audio/mp3" => Some("mp3"),
                "audio/mp4" | "audio/m4a" | "audio/x-m4a" => Some("m4a"),
                "audio/flac" => Some("flac"),
                _ => None,
            }
        });

        from_mime
            .or_else(|| {
                let ext = Path::new(&self.file_name).extension()?.to_str()?;
                match ext.to_ascii_lowercase().as_str() {
                    "webm" => Some("webm"),
                    "ogg" | "opus" => Some("ogg"),
                    "wav" => Some("wav"),
                    "mp3" => Some("mp3"),
                    "m4a" | "mp4" => Some("m4a"),
                    "flac" => Some("flac"),
                    _ => None,
                }
            })
            .unwrap_or("webm")
    }

    fn mime(&self) -> &str {
        self.content_type.as_deref().unwrap_or("audio/webm")
    }
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, job_id: &str, audio: AudioPayload) -> Result<String>;

    fn name(&self) -> &str;

    fn health(&self) -> ProviderHealth;
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

pub struct WhisperTranscriber {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    language: String,
}

impl WhisperTranscriber {
    pub fn new(config: &TranscriptionConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| KaizenError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/audio/transcriptions",
                config.base_url.trim_end_matches('/')
            ),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            language: config.language.clone(),
        })
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, job_id: &str, audio: AudioPayload) -> Result<String> {
        if self.api_key.trim().is_empty() {
            return Err(KaizenError::transcription(
                "Transcription failed: API key is not configured",
            ));
        }

        let size = audio.len();
        let file_name = format!("{}.{}", job_id, audio.extension());
        let part = Part::bytes(audio.bytes.to_vec())
            .file_name(file_name)
            .mime_str(audio.mime())
            .map_err(|e| KaizenError::transcription(format!("Invalid audio content type: {}", e)))?;

        let mut form = Form::new()
            .text("model", self.model.clone())
            .text("response_format", "json")
            .part("file", part);
        if !self.language.is_empty() {
            form = form.text("language", self.language.clone());
        }

        debug!("Submitting {} bytes for transcription job {}", size, job_id);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| KaizenError::transcription(format!("Transcription failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KaizenError::transcription(format!(
                "Transcription job failed: status {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let parsed: TranscriptionResponse = response.json().await.map_err(|e| {
            KaizenError::transcription(format!("Failed to download transcript: {}", e))
        })?;

        let transcript = parsed.text.trim().to_string();
        if transcript.is_empty() {
            return Err(KaizenError::transcription(
                "Transcription job failed: empty transcript",
            ));
        }

        info!(
            "Transcription job {} completed: {} characters",
            job_id,
            transcript.chars().count()
        );
        Ok(transcript)
    }

    fn name(&self) -> &str {
        &self.model
    }

    fn health(&self) -> ProviderHealth {
        if self.api_key.trim().is_empty() {
            ProviderHealth::Error("API key is not configured".to_string())
        } else {
            ProviderHealth::Healthy
        }
    }
}

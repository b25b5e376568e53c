//! 录音存档
//!
//! 每条录音写到 `<directory>/audio/{job_id}.{ext}`，key 为相对路径。

use std::path::PathBuf;

use tracing::{info, warn};

use crate::ai::AudioPayload;
use crate::config::ArchiveConfig;
use crate::errors::{KaizenError, Result};

#[derive(Debug, Clone)]
pub struct AudioArchive {
    root: Option<PathBuf>,
}

impl AudioArchive {
    pub fn new(config: &ArchiveConfig) -> Self {
        Self {
            root: config.enabled.then(|| PathBuf::from(&config.directory)),
        }
    }

    pub fn disabled() -> Self {
        Self { root: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.root.is_some()
    }

    pub fn key_for(job_id: &str, extension: &str) -> String {
        format!("audio/{}.{}", job_id, extension)
    }

    /// 启动时创建存档目录
    pub async fn ensure_dir(&self) -> Result<()> {
        if let Some(root) = &self.root {
            tokio::fs::create_dir_all(root.join("audio"))
                .await
                .map_err(|e| {
                    KaizenError::file_operation(format!(
                        "Cannot create archive directory {}: {}",
                        root.display(),
                        e
                    ))
                })?;
        }
        Ok(())
    }

    /// 写入录音，返回 key；未启用或写入失败返回 None
    pub async fn store(&self, job_id: &str, audio: &AudioPayload) -> Option<String> {
        let root = self.root.as_ref()?;
        let key = Self::key_for(job_id, audio.extension());
        let path = root.join(&key);

        let result = async {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&path, &audio.bytes).await
        }
        .await;

        match result {
            Ok(()) => {
                info!("Audio archived: {}", path.display());
                Some(key)
            }
            Err(e) => {
                warn!("Audio archive failed for job {}: {}", job_id, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn archive_in(dir: &Path) -> AudioArchive {
        AudioArchive::new(&ArchiveConfig {
            enabled: true,
            directory: dir.to_string_lossy().into_owned(),
        })
    }

    #[tokio::test]
    async fn test_store_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let archive = archive_in(dir.path());
        let audio = AudioPayload::new(vec![1u8, 2, 3], "note.webm");

        let key = archive.store("kaizen_0011aabb", &audio).await.unwrap();
        assert_eq!(key, "audio/kaizen_0011aabb.webm");

        let written = std::fs::read(dir.path().join(&key)).unwrap();
        assert_eq!(written, vec![1u8, 2, 3]);
    }

    #[tokio::test]
    async fn test_disabled_archive_skips() {
        let archive = AudioArchive::new(&ArchiveConfig {
            enabled: false,
            directory: "unused".into(),
        });
        assert!(!archive.is_enabled());
        let audio = AudioPayload::new(vec![1u8], "note.webm");
        assert!(archive.store("kaizen_00000000", &audio).await.is_none());
    }

    #[tokio::test]
    async fn test_store_failure_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        // 用普通文件占住目录位置，写入必然失败
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, b"x").unwrap();
        let archive = archive_in(&blocker);

        let audio = AudioPayload::new(vec![1u8], "note.webm");
        assert!(archive.store("kaizen_00000000", &audio).await.is_none());
    }

    #[tokio::test]
    async fn test_ensure_dir_creates_audio_subdir() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("recordings");
        archive_in(&root).ensure_dir().await.unwrap();
        assert!(root.join("audio").is_dir());
    }
}

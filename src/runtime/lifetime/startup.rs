use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::ai::{LeanClassifier, Transcriber, WhisperTranscriber};
use crate::config::StaticConfig;
use crate::services::{AudioArchive, SuggestionService};
use crate::storage::{SeaOrmStorage, StorageFactory};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub suggestion_service: Arc<SuggestionService>,
}

/// 安装 rustls 加密后端（重复安装忽略）
pub fn install_crypto_provider() {
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }
}

/// 按配置组装存储、AI 客户端、录音存档和业务服务
///
/// 顺序：storage（含迁移）→ AI clients → archive → service。
/// CLI 命令也走这里，只在出错时输出警告。
pub async fn build_context(config: &StaticConfig) -> Result<StartupContext> {
    let storage = StorageFactory::create(&config.database)
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    let transcriber: Arc<dyn Transcriber> = Arc::new(
        WhisperTranscriber::new(&config.transcription)
            .context("Failed to create transcription client")?,
    );
    let classifier = Arc::new(
        LeanClassifier::new(&config.classifier).context("Failed to create classifier client")?,
    );

    let archive = AudioArchive::new(&config.archive);
    if archive.is_enabled() {
        if let Err(e) = archive.ensure_dir().await {
            warn!("{} (recordings will not be archived until it exists)", e);
        }
    } else {
        debug!("Audio archive disabled");
    }

    let suggestion_service = Arc::new(SuggestionService::new(
        storage.clone(),
        transcriber,
        classifier,
        Arc::new(archive),
        config.suggestions.clone(),
    ));

    Ok(StartupContext {
        storage,
        suggestion_service,
    })
}

/// AI 服务缺少配置时提示（服务仍可启动）
fn report_provider_health(service: &SuggestionService) {
    let transcription_health = service.transcriber().health();
    if !transcription_health.is_healthy() {
        warn!("Transcription service: {}", transcription_health);
    }
    let classification_health = service.classifier().health();
    if !classification_health.is_healthy() {
        warn!(
            "Classification service: {} (suggestions will be queued for manual review)",
            classification_health
        );
    } else {
        info!("Classification model: {}", service.classifier().name());
    }
}

/// 准备服务器启动的上下文
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    install_crypto_provider();
    let context = build_context(config).await?;
    report_provider_health(&context.suggestion_service);

    info!("Pre-startup completed in {:?}", start_time.elapsed());
    Ok(context)
}

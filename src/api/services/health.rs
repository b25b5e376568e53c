use std::sync::Arc;
use std::time::{Duration, Instant};

use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use tracing::{error, info, trace};

use crate::errors::KaizenError;
use crate::services::SuggestionService;

const DB_PING_TIMEOUT: Duration = Duration::from_secs(5);
pub const WELCOME_MESSAGE: &str =
    "Kaizen Voice Recorder API - Ready to capture your improvement ideas!";

// 应用启动时间
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

impl AppStartTime {
    pub fn now() -> Self {
        Self {
            start_datetime: chrono::Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub database: &'static str,
    pub transcription: String,
    pub classification: String,
    /// 运行秒数
    pub uptime: u64,
}

/// Health Service
///
/// 数据库 ping 决定整体状态；AI 服务只看配置，不做网络探测。
pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        service: web::Data<Arc<SuggestionService>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> Result<HttpResponse, KaizenError> {
        let start_time = Instant::now();
        trace!("Received health check request");

        match tokio::time::timeout(DB_PING_TIMEOUT, service.storage().ping()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!("Database health check failed: {}", e);
                return Err(KaizenError::database_connection(format!(
                    "Service unhealthy: {}",
                    e.message()
                )));
            }
            Err(_) => {
                error!("Database health check timeout");
                return Err(KaizenError::database_connection(
                    "Service unhealthy: database ping timed out",
                ));
            }
        }

        let now = chrono::Utc::now();
        let uptime = (now - app_start_time.start_datetime).num_seconds().max(0) as u64;

        let body = HealthResponse {
            status: "healthy",
            timestamp: now.to_rfc3339(),
            database: "connected",
            transcription: service.transcriber().health().to_string(),
            classification: service.classifier().health().to_string(),
            uptime,
        };

        info!(
            "Health check completed in {:?}, uptime {}s",
            start_time.elapsed(),
            uptime
        );
        Ok(HttpResponse::Ok().json(body))
    }

    pub async fn root() -> impl Responder {
        HttpResponse::Ok().json(serde_json::json!({ "message": WELCOME_MESSAGE }))
    }
}

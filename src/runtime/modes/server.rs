//! Server mode
//!
//! Builds the application context and runs the HTTP server until it stops
//! or Ctrl+C arrives.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::Result;
use tracing::warn;

use crate::api::middleware::{ErrorLogMiddleware, RequestIdMiddleware};
use crate::api::services::{AppStartTime, UploadLimit, api_routes};
use crate::config::{CorsConfig, get_config};
use crate::runtime::lifetime;
use crate::services::SuggestionService;
use crate::storage::SeaOrmStorage;

/// Validate CORS configuration at startup (runs once)
fn validate_cors_config(cors_config: &CorsConfig) {
    if cors_config.allowed_origins.is_empty() {
        warn!(
            "cors.allowed_origins is empty. \
            No cross-origin requests will be allowed. \
            Use '[\"*\"]' for any origin."
        );
    }
}

/// Build CORS middleware from configuration
pub fn build_cors_middleware(cors_config: &CorsConfig) -> Cors {
    let mut cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(cors_config.max_age);

    if cors_config.allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

/// 组装 App，server 与集成测试共用
pub fn configure_app(
    cfg: &mut web::ServiceConfig,
    storage: Arc<SeaOrmStorage>,
    suggestion_service: Arc<SuggestionService>,
    app_start_time: AppStartTime,
    max_upload_bytes: usize,
) {
    cfg.app_data(web::Data::new(storage))
        .app_data(web::Data::new(suggestion_service))
        .app_data(web::Data::new(app_start_time))
        .app_data(web::Data::new(UploadLimit(max_upload_bytes)))
        .service(api_routes());
}

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime::now();
    let config = get_config();

    let startup = lifetime::startup::prepare_server_startup(&config)
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {}", e);
            e
        })?;

    let storage = startup.storage.clone();
    let suggestion_service = startup.suggestion_service.clone();

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let cors_config = config.cors.clone();
    validate_cors_config(&cors_config);

    let max_upload_bytes = config.server.max_upload_bytes;
    let db_for_shutdown = storage.get_db().clone();

    let server = HttpServer::new(move || {
        let cors = build_cors_middleware(&cors_config);
        let storage = storage.clone();
        let suggestion_service = suggestion_service.clone();
        let app_start_time = app_start_time.clone();

        App::new()
            .wrap(ErrorLogMiddleware)
            .wrap(RequestIdMiddleware)
            .wrap(cors)
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-cache, no-store, must-revalidate")))
            .configure(move |cfg| {
                configure_app(
                    cfg,
                    storage,
                    suggestion_service,
                    app_start_time,
                    max_upload_bytes,
                )
            })
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server.bind(&bind_address)?.run();

    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(&db_for_shutdown) => {
            warn!("Graceful shutdown completed");
        }
    }

    Ok(())
}

pub mod health;
pub mod suggestions;
pub mod transcribe;

use actix_web::{HttpRequest, error::JsonPayloadError, error::QueryPayloadError, web};

pub use health::{AppStartTime, HealthService, WELCOME_MESSAGE};
pub use suggestions::SuggestionsApi;
pub use transcribe::{TranscribeService, UploadLimit};

use crate::errors::KaizenError;

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    KaizenError::validation(format!("Invalid request body: {}", err)).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    KaizenError::validation(format!("Invalid query parameters: {}", err)).into()
}

/// `/api` 路由
pub fn api_routes() -> actix_web::Scope {
    web::scope("/api")
        .app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .route("", web::get().to(HealthService::root))
        .route("/", web::get().to(HealthService::root))
        .route("/health", web::get().to(HealthService::health_check))
        .route("/health", web::head().to(HealthService::health_check))
        .route("/transcribe", web::post().to(TranscribeService::transcribe))
        .route("/suggestions", web::get().to(SuggestionsApi::list))
        .route("/suggestions/{id}", web::get().to(SuggestionsApi::get))
        .route(
            "/suggestions/{id}/status",
            web::post().to(SuggestionsApi::update_status),
        )
}

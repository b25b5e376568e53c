use std::sync::Arc;

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::errors::KaizenError;
use crate::services::{ListQuery, SuggestionService};

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusUpdateResponse {
    pub success: bool,
    pub message: String,
}

pub struct SuggestionsApi;

impl SuggestionsApi {
    pub async fn list(
        service: web::Data<Arc<SuggestionService>>,
        query: web::Query<ListQuery>,
    ) -> Result<HttpResponse, KaizenError> {
        trace!("List suggestions: {:?}", query);
        let page = service.list(query.into_inner()).await?;
        Ok(HttpResponse::Ok().json(page))
    }

    pub async fn get(
        service: web::Data<Arc<SuggestionService>>,
        path: web::Path<String>,
    ) -> Result<HttpResponse, KaizenError> {
        let suggestion = service.get(&path.into_inner()).await?;
        Ok(HttpResponse::Ok().json(suggestion))
    }

    pub async fn update_status(
        service: web::Data<Arc<SuggestionService>>,
        path: web::Path<String>,
        body: web::Json<StatusUpdateRequest>,
    ) -> Result<HttpResponse, KaizenError> {
        let id = path.into_inner();
        let raw_status = body.into_inner().status.unwrap_or_default();

        let message = service.update_status(&id, &raw_status).await?;
        Ok(HttpResponse::Ok().json(StatusUpdateResponse {
            success: true,
            message,
        }))
    }
}

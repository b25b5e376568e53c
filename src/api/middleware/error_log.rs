//! 5xx 错误落库
//!
//! 服务端错误（状态码 >= 500）写入 error_logs 表，尽力而为，不影响响应。

use std::rc::Rc;
use std::sync::Arc;

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    dev::{ServiceRequest, ServiceResponse},
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::error;

use super::RequestId;
use crate::errors::KaizenError;
use crate::storage::{ErrorLogEntry, SeaOrmStorage};

#[derive(Clone, Default)]
pub struct ErrorLogMiddleware;

impl<S, B> Transform<S, ServiceRequest> for ErrorLogMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ErrorLogService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorLogService {
            service: Rc::new(service),
        }))
    }
}

pub struct ErrorLogService<S> {
    service: Rc<S>,
}

/// 优先取 KaizenError 的原始消息
fn error_message(err: &Error) -> String {
    match err.as_error::<KaizenError>() {
        Some(kaizen) => kaizen.message().to_string(),
        None => err.to_string(),
    }
}

impl<S, B> Service<ServiceRequest> for ErrorLogService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let storage = req
            .app_data::<web::Data<Arc<SeaOrmStorage>>>()
            .map(|data| data.get_ref().clone());
        let endpoint = req.uri().to_string();
        let method = req.method().to_string();
        // RequestIdMiddleware 在外层，这里已能取到
        let request_id = req
            .extensions()
            .get::<RequestId>()
            .map(|id| id.0.clone())
            .unwrap_or_default();

        Box::pin(async move {
            let result = srv.call(req).await;

            let failure = match &result {
                Ok(response) if response.status().is_server_error() => Some(
                    response
                        .response()
                        .error()
                        .map(error_message)
                        .unwrap_or_else(|| response.status().to_string()),
                ),
                Ok(_) => None,
                Err(e) if e.as_response_error().status_code().is_server_error() => {
                    Some(error_message(e))
                }
                Err(_) => None,
            };

            if let Some(message) = failure {
                error!(
                    request_id = %request_id,
                    "{} {} failed: {}", method, endpoint, message
                );
                if let Some(storage) = storage {
                    storage
                        .record_error(ErrorLogEntry::new(message, endpoint, method))
                        .await;
                }
            }

            result
        })
    }
}

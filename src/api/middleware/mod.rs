pub mod error_log;
pub mod request_id;

pub use error_log::ErrorLogMiddleware;
pub use request_id::{RequestId, RequestIdMiddleware};

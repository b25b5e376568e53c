use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KaizenError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
    Transcription(String),
    Classification(String),
    InvalidTransition(String),
    PayloadTooLarge(String),
    InvalidMultipartData(String),
    Config(String),
}

impl KaizenError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            KaizenError::DatabaseConfig(_) => "E001",
            KaizenError::DatabaseConnection(_) => "E002",
            KaizenError::DatabaseOperation(_) => "E003",
            KaizenError::FileOperation(_) => "E004",
            KaizenError::Validation(_) => "E005",
            KaizenError::NotFound(_) => "E006",
            KaizenError::Serialization(_) => "E007",
            KaizenError::Transcription(_) => "E008",
            KaizenError::Classification(_) => "E009",
            KaizenError::InvalidTransition(_) => "E010",
            KaizenError::PayloadTooLarge(_) => "E011",
            KaizenError::InvalidMultipartData(_) => "E012",
            KaizenError::Config(_) => "E013",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            KaizenError::DatabaseConfig(_) => "Database Configuration Error",
            KaizenError::DatabaseConnection(_) => "Database Connection Error",
            KaizenError::DatabaseOperation(_) => "Database Operation Error",
            KaizenError::FileOperation(_) => "File Operation Error",
            KaizenError::Validation(_) => "Validation Error",
            KaizenError::NotFound(_) => "Resource Not Found",
            KaizenError::Serialization(_) => "Serialization Error",
            KaizenError::Transcription(_) => "Transcription Error",
            KaizenError::Classification(_) => "Classification Error",
            KaizenError::InvalidTransition(_) => "Invalid Status Transition",
            KaizenError::PayloadTooLarge(_) => "Payload Too Large",
            KaizenError::InvalidMultipartData(_) => "Invalid Multipart Data",
            KaizenError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            KaizenError::DatabaseConfig(msg)
            | KaizenError::DatabaseConnection(msg)
            | KaizenError::DatabaseOperation(msg)
            | KaizenError::FileOperation(msg)
            | KaizenError::Validation(msg)
            | KaizenError::NotFound(msg)
            | KaizenError::Serialization(msg)
            | KaizenError::Transcription(msg)
            | KaizenError::Classification(msg)
            | KaizenError::InvalidTransition(msg)
            | KaizenError::PayloadTooLarge(msg)
            | KaizenError::InvalidMultipartData(msg)
            | KaizenError::Config(msg) => msg,
        }
    }

    /// 映射到 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self {
            KaizenError::Validation(_) | KaizenError::InvalidMultipartData(_) => {
                StatusCode::BAD_REQUEST
            }
            KaizenError::NotFound(_) => StatusCode::NOT_FOUND,
            KaizenError::InvalidTransition(_) => StatusCode::CONFLICT,
            KaizenError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            KaizenError::DatabaseConnection(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    #[cfg(feature = "server")]
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 给消息加前缀，保留错误类型
    pub fn with_prefix(self, prefix: &str) -> Self {
        let wrap = |msg: String| format!("{}: {}", prefix, msg);
        match self {
            KaizenError::DatabaseConfig(m) => KaizenError::DatabaseConfig(wrap(m)),
            KaizenError::DatabaseConnection(m) => KaizenError::DatabaseConnection(wrap(m)),
            KaizenError::DatabaseOperation(m) => KaizenError::DatabaseOperation(wrap(m)),
            KaizenError::FileOperation(m) => KaizenError::FileOperation(wrap(m)),
            KaizenError::Validation(m) => KaizenError::Validation(wrap(m)),
            KaizenError::NotFound(m) => KaizenError::NotFound(wrap(m)),
            KaizenError::Serialization(m) => KaizenError::Serialization(wrap(m)),
            KaizenError::Transcription(m) => KaizenError::Transcription(wrap(m)),
            KaizenError::Classification(m) => KaizenError::Classification(wrap(m)),
            KaizenError::InvalidTransition(m) => KaizenError::InvalidTransition(wrap(m)),
            KaizenError::PayloadTooLarge(m) => KaizenError::PayloadTooLarge(wrap(m)),
            KaizenError::InvalidMultipartData(m) => KaizenError::InvalidMultipartData(wrap(m)),
            KaizenError::Config(m) => KaizenError::Config(wrap(m)),
        }
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for KaizenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for KaizenError {}

// 便捷的构造函数
impl KaizenError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        KaizenError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        KaizenError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        KaizenError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        KaizenError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        KaizenError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        KaizenError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        KaizenError::Serialization(msg.into())
    }

    pub fn transcription<T: Into<String>>(msg: T) -> Self {
        KaizenError::Transcription(msg.into())
    }

    pub fn classification<T: Into<String>>(msg: T) -> Self {
        KaizenError::Classification(msg.into())
    }

    pub fn invalid_transition<T: Into<String>>(msg: T) -> Self {
        KaizenError::InvalidTransition(msg.into())
    }

    pub fn payload_too_large<T: Into<String>>(msg: T) -> Self {
        KaizenError::PayloadTooLarge(msg.into())
    }

    pub fn invalid_multipart_data<T: Into<String>>(msg: T) -> Self {
        KaizenError::InvalidMultipartData(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        KaizenError::Config(msg.into())
    }
}

/// HTTP 错误响应体
///
/// `detail` 字段与前端约定一致。
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub detail: &'a str,
    pub code: &'static str,
}

impl ResponseError for KaizenError {
    fn status_code(&self) -> StatusCode {
        self.http_status()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.http_status()).json(ErrorBody {
            detail: self.message(),
            code: self.code(),
        })
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for KaizenError {
    fn from(err: sea_orm::DbErr) -> Self {
        KaizenError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for KaizenError {
    fn from(err: std::io::Error) -> Self {
        KaizenError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for KaizenError {
    fn from(err: serde_json::Error) -> Self {
        KaizenError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KaizenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let errors = [
            KaizenError::database_config("x"),
            KaizenError::database_connection("x"),
            KaizenError::database_operation("x"),
            KaizenError::file_operation("x"),
            KaizenError::validation("x"),
            KaizenError::not_found("x"),
            KaizenError::serialization("x"),
            KaizenError::transcription("x"),
            KaizenError::classification("x"),
            KaizenError::invalid_transition("x"),
            KaizenError::payload_too_large("x"),
            KaizenError::invalid_multipart_data("x"),
            KaizenError::config("x"),
        ];
        let codes: std::collections::HashSet<_> = errors.iter().map(|e| e.code()).collect();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(
            KaizenError::validation("bad").http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            KaizenError::not_found("missing").http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            KaizenError::invalid_transition("no").http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            KaizenError::transcription("down").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_format_simple() {
        let err = KaizenError::not_found("Suggestion not found");
        assert_eq!(err.to_string(), "Resource Not Found: Suggestion not found");
    }

    #[test]
    fn test_with_prefix_keeps_kind() {
        let err = KaizenError::transcription("upstream 502").with_prefix("Processing failed");
        assert_eq!(err.code(), "E008");
        assert_eq!(err.message(), "Processing failed: upstream 502");
    }

    #[test]
    fn test_from_serde_json_error() {
        let err: KaizenError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.code(), "E007");
    }
}

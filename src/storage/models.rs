use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{LeanCategory, SuggestionStatus};

/// 建议列表过滤条件
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct SuggestionFilter {
    pub status: Option<SuggestionStatus>,
    pub lean_category: Option<LeanCategory>,
}

impl SuggestionFilter {
    /// COUNT 缓存 key
    pub(crate) fn cache_key(&self) -> String {
        format!(
            "count:s={}:c={}",
            self.status.map(|s| s.as_str()).unwrap_or("*"),
            self.lean_category.map(|c| c.as_str()).unwrap_or("*")
        )
    }
}

/// 错误日志条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorLogEntry {
    pub error: String,
    pub endpoint: String,
    pub method: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorLogEntry {
    pub fn new(
        error: impl Into<String>,
        endpoint: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            endpoint: endpoint.into(),
            method: method.into(),
            timestamp: Utc::now(),
        }
    }
}

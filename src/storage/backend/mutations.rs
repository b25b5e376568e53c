//! Mutation operations for SeaOrmStorage
//!
//! This module contains all write database operations.

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, sea_query::Expr};
use tracing::{info, warn};

use super::converters::suggestion_to_active_model;
use super::{SeaOrmStorage, retry};
use crate::domain::{KaizenSuggestion, SuggestionStatus};
use crate::errors::{KaizenError, Result};
use crate::storage::models::ErrorLogEntry;

use migration::entities::{error_log, kaizen_suggestion};

impl SeaOrmStorage {
    /// 插入新建议，返回其 id
    pub async fn insert_suggestion(&self, suggestion: &KaizenSuggestion) -> Result<String> {
        let db = &self.db;

        retry::with_retry(
            &format!("insert({})", suggestion.job_id),
            self.retry_config,
            || async {
                kaizen_suggestion::Entity::insert(suggestion_to_active_model(suggestion))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| KaizenError::database_operation(format!("Database storage failed: {}", e)))?;

        self.invalidate_count_cache();
        info!(
            "Suggestion stored: {} (job {})",
            suggestion.id, suggestion.job_id
        );
        Ok(suggestion.id.clone())
    }

    /// 更新状态，返回是否命中记录
    pub async fn update_status(
        &self,
        id: &str,
        status: SuggestionStatus,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        self.write_status(id, None, status, now).await
    }

    /// 仅当当前状态仍为 `expected` 时更新（compare-and-set）
    ///
    /// 返回 false 表示记录不存在或状态已被其他请求改动。
    pub async fn update_status_if(
        &self,
        id: &str,
        expected: SuggestionStatus,
        next: SuggestionStatus,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        self.write_status(id, Some(expected), next, now).await
    }

    async fn write_status(
        &self,
        id: &str,
        expected: Option<SuggestionStatus>,
        status: SuggestionStatus,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let db = &self.db;

        let mut condition = Condition::all().add(kaizen_suggestion::Column::Id.eq(id));
        if let Some(expected) = expected {
            condition = condition.add(kaizen_suggestion::Column::Status.eq(expected.as_str()));
        }

        let result = retry::with_retry(
            &format!("update_status({})", id),
            self.retry_config,
            || async {
                kaizen_suggestion::Entity::update_many()
                    .col_expr(kaizen_suggestion::Column::Status, Expr::value(status.as_str()))
                    .col_expr(kaizen_suggestion::Column::LastUpdated, Expr::value(now))
                    .filter(condition.clone())
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| KaizenError::database_operation(format!("Failed to update status: {}", e)))?;

        if result.rows_affected == 0 {
            return Ok(false);
        }

        self.invalidate_count_cache();
        info!("Suggestion {} status set to {}", id, status);
        Ok(true)
    }

    /// 记录错误日志（尽力而为，失败只打日志）
    pub async fn record_error(&self, entry: ErrorLogEntry) {
        use sea_orm::ActiveValue::*;

        let model = error_log::ActiveModel {
            id: NotSet,
            error: Set(entry.error),
            endpoint: Set(entry.endpoint),
            method: Set(entry.method),
            timestamp: Set(entry.timestamp),
        };

        if let Err(e) = error_log::Entity::insert(model).exec(&self.db).await {
            warn!("Failed to write error log: {}", e);
        }
    }
}

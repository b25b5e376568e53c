//! Query operations for SeaOrmStorage
//!
//! This module contains all read-only database operations.

use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use tracing::{debug, error};

use super::converters::model_to_suggestion;
use super::{SeaOrmStorage, retry};
use crate::domain::KaizenSuggestion;
use crate::errors::{KaizenError, Result};
use crate::storage::models::{ErrorLogEntry, SuggestionFilter};

use migration::entities::{error_log, kaizen_suggestion};

fn filter_condition(filter: &SuggestionFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some(status) = filter.status {
        condition = condition.add(kaizen_suggestion::Column::Status.eq(status.as_str()));
    }

    if let Some(category) = filter.lean_category {
        condition = condition.add(kaizen_suggestion::Column::LeanCategory.eq(category.as_str()));
    }

    condition
}

impl SeaOrmStorage {
    /// 数据库连通性检查
    pub async fn ping(&self) -> Result<()> {
        self.db
            .ping()
            .await
            .map_err(|e| KaizenError::database_connection(format!("ping failed: {}", e)))
    }

    pub async fn get_suggestion(&self, id: &str) -> Result<Option<KaizenSuggestion>> {
        let db = &self.db;
        let id_owned = id.to_string();

        let model = retry::with_retry(&format!("get({})", id), self.retry_config, || async {
            kaizen_suggestion::Entity::find_by_id(id_owned.clone())
                .one(db)
                .await
        })
        .await
        .map_err(|e| {
            error!("Failed to load suggestion {}: {}", id, e);
            KaizenError::database_operation(format!("Failed to load suggestion: {}", e))
        })?;

        model.map(model_to_suggestion).transpose()
    }

    /// 分页查询，按 timestamp 倒序
    pub async fn list_suggestions(
        &self,
        filter: &SuggestionFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<KaizenSuggestion>> {
        let db = &self.db;

        let models = retry::with_retry("list_suggestions", self.retry_config, || async {
            kaizen_suggestion::Entity::find()
                .filter(filter_condition(filter))
                .order_by_desc(kaizen_suggestion::Column::Timestamp)
                .order_by_desc(kaizen_suggestion::Column::Id)
                .offset(skip)
                .limit(limit)
                .all(db)
                .await
        })
        .await
        .map_err(|e| {
            KaizenError::database_operation(format!("Failed to retrieve suggestions: {}", e))
        })?;

        debug!(
            "Loaded {} suggestions (skip={}, limit={})",
            models.len(),
            skip,
            limit
        );

        models.into_iter().map(model_to_suggestion).collect()
    }

    /// 带 COUNT 缓存的计数
    pub async fn count_suggestions(&self, filter: &SuggestionFilter) -> Result<u64> {
        let cache_key = filter.cache_key();
        if let Some(count) = self.count_cache.get(&cache_key) {
            return Ok(count);
        }

        let db = &self.db;
        let count = retry::with_retry("count_suggestions", self.retry_config, || async {
            kaizen_suggestion::Entity::find()
                .filter(filter_condition(filter))
                .count(db)
                .await
        })
        .await
        .map_err(|e| {
            KaizenError::database_operation(format!("Failed to count suggestions: {}", e))
        })?;

        self.count_cache.insert(cache_key, count);
        Ok(count)
    }

    /// 最近的错误日志，按时间倒序
    pub async fn recent_errors(&self, limit: u64) -> Result<Vec<ErrorLogEntry>> {
        let models = error_log::Entity::find()
            .order_by_desc(error_log::Column::Timestamp)
            .order_by_desc(error_log::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(models
            .into_iter()
            .map(|m| ErrorLogEntry {
                error: m.error,
                endpoint: m.endpoint,
                method: m.method,
                timestamp: m.timestamp,
            })
            .collect())
    }
}

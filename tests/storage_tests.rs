//! Storage backend tests
//!
//! Tests for SeaOrmStorage using temporary SQLite databases.

use chrono::{Duration, Utc};
use kaizen_voice::config::DatabaseConfig;
use kaizen_voice::domain::{
    Analysis, KaizenSuggestion, LeanCategory, SubmissionMetadata, SuggestionLevel,
    SuggestionStatus,
};
use kaizen_voice::storage::{ErrorLogEntry, SeaOrmStorage, SuggestionFilter};
use tempfile::TempDir;

/// 创建临时 SQLite 数据库的存储实例
async fn create_temp_storage() -> (SeaOrmStorage, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..Default::default()
    };

    let storage = SeaOrmStorage::new(&config)
        .await
        .expect("Failed to create storage");

    (storage, temp_dir)
}

/// 创建测试用的建议，timestamp 往前偏移 `age_minutes`
fn create_test_suggestion(job: &str, category: LeanCategory, age_minutes: i64) -> KaizenSuggestion {
    let analysis = Analysis {
        summary: format!("summary for {}", job),
        lean_category: category,
        suggestion_level: SuggestionLevel::JustDoIt,
        reasoning: "test".to_string(),
    };
    let metadata = SubmissionMetadata {
        location: Some("Line 2".into()),
        shift: Some("B".into()),
        associate_name: None,
    };
    let mut suggestion = KaizenSuggestion::new(
        job.to_string(),
        format!("transcript for {}", job),
        analysis,
        metadata,
        None,
    );
    suggestion.timestamp = Utc::now() - Duration::minutes(age_minutes);
    suggestion
}

#[tokio::test]
async fn test_insert_and_get_roundtrip() {
    let (storage, _dir) = create_temp_storage().await;
    let suggestion = create_test_suggestion("kaizen_aaaa0001", LeanCategory::Waiting, 0);

    let id = storage.insert_suggestion(&suggestion).await.unwrap();
    assert_eq!(id, suggestion.id);

    let loaded = storage.get_suggestion(&id).await.unwrap().unwrap();
    assert_eq!(loaded.job_id, "kaizen_aaaa0001");
    assert_eq!(loaded.lean_category, LeanCategory::Waiting);
    assert_eq!(loaded.suggestion_level, SuggestionLevel::JustDoIt);
    assert_eq!(loaded.status, SuggestionStatus::PendingReview);
    assert_eq!(loaded.location.as_deref(), Some("Line 2"));
    assert!(loaded.associate_name.is_none());
    assert!(loaded.last_updated.is_none());
}

#[tokio::test]
async fn test_get_missing_returns_none() {
    let (storage, _dir) = create_temp_storage().await;
    assert!(storage.get_suggestion("no-such-id").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_job_id_rejected() {
    let (storage, _dir) = create_temp_storage().await;
    let first = create_test_suggestion("kaizen_dup00001", LeanCategory::Motion, 0);
    let second = create_test_suggestion("kaizen_dup00001", LeanCategory::Motion, 0);

    storage.insert_suggestion(&first).await.unwrap();
    let err = storage.insert_suggestion(&second).await.unwrap_err();
    assert_eq!(err.code(), "E003");
}

#[tokio::test]
async fn test_list_newest_first_with_pagination() {
    let (storage, _dir) = create_temp_storage().await;
    for (job, age) in [("kaizen_old00001", 30), ("kaizen_new00001", 1), ("kaizen_mid00001", 10)] {
        storage
            .insert_suggestion(&create_test_suggestion(job, LeanCategory::Motion, age))
            .await
            .unwrap();
    }

    let filter = SuggestionFilter::default();
    let all = storage.list_suggestions(&filter, 0, 10).await.unwrap();
    let jobs: Vec<_> = all.iter().map(|s| s.job_id.as_str()).collect();
    assert_eq!(jobs, vec!["kaizen_new00001", "kaizen_mid00001", "kaizen_old00001"]);

    let page = storage.list_suggestions(&filter, 1, 1).await.unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].job_id, "kaizen_mid00001");

    assert_eq!(storage.count_suggestions(&filter).await.unwrap(), 3);
}

#[tokio::test]
async fn test_filter_by_status_and_category() {
    let (storage, _dir) = create_temp_storage().await;
    let waiting = create_test_suggestion("kaizen_wait0001", LeanCategory::Waiting, 2);
    let defects = create_test_suggestion("kaizen_defe0001", LeanCategory::Defects, 1);
    storage.insert_suggestion(&waiting).await.unwrap();
    storage.insert_suggestion(&defects).await.unwrap();
    storage
        .update_status(&defects.id, SuggestionStatus::Approved, Utc::now())
        .await
        .unwrap();

    let by_category = SuggestionFilter {
        lean_category: Some(LeanCategory::Waiting),
        ..Default::default()
    };
    let found = storage.list_suggestions(&by_category, 0, 10).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, waiting.id);

    let approved = SuggestionFilter {
        status: Some(SuggestionStatus::Approved),
        ..Default::default()
    };
    assert_eq!(storage.count_suggestions(&approved).await.unwrap(), 1);

    let approved_waiting = SuggestionFilter {
        status: Some(SuggestionStatus::Approved),
        lean_category: Some(LeanCategory::Waiting),
    };
    assert_eq!(storage.count_suggestions(&approved_waiting).await.unwrap(), 0);
}

#[tokio::test]
async fn test_count_cache_invalidated_on_insert() {
    let (storage, _dir) = create_temp_storage().await;
    let filter = SuggestionFilter::default();

    assert_eq!(storage.count_suggestions(&filter).await.unwrap(), 0);
    storage
        .insert_suggestion(&create_test_suggestion("kaizen_cnt00001", LeanCategory::Inventory, 0))
        .await
        .unwrap();
    assert_eq!(storage.count_suggestions(&filter).await.unwrap(), 1);
}

#[tokio::test]
async fn test_update_status_sets_last_updated() {
    let (storage, _dir) = create_temp_storage().await;
    let suggestion = create_test_suggestion("kaizen_upd00001", LeanCategory::Motion, 0);
    storage.insert_suggestion(&suggestion).await.unwrap();

    let now = Utc::now();
    assert!(
        storage
            .update_status(&suggestion.id, SuggestionStatus::Rejected, now)
            .await
            .unwrap()
    );

    let loaded = storage.get_suggestion(&suggestion.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, SuggestionStatus::Rejected);
    let updated = loaded.last_updated.unwrap();
    assert!((updated - now).num_seconds().abs() <= 1);
}

#[tokio::test]
async fn test_update_status_unknown_id() {
    let (storage, _dir) = create_temp_storage().await;
    let updated = storage
        .update_status("missing", SuggestionStatus::Approved, Utc::now())
        .await
        .unwrap();
    assert!(!updated);
}

#[tokio::test]
async fn test_update_status_if_checks_current_status() {
    let (storage, _dir) = create_temp_storage().await;
    let suggestion = create_test_suggestion("kaizen_cas00001", LeanCategory::Motion, 0);
    storage.insert_suggestion(&suggestion).await.unwrap();

    let stale = storage
        .update_status_if(
            &suggestion.id,
            SuggestionStatus::Approved,
            SuggestionStatus::Implemented,
            Utc::now(),
        )
        .await
        .unwrap();
    assert!(!stale);
    let loaded = storage.get_suggestion(&suggestion.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, SuggestionStatus::PendingReview);
    assert!(loaded.last_updated.is_none());

    let applied = storage
        .update_status_if(
            &suggestion.id,
            SuggestionStatus::PendingReview,
            SuggestionStatus::Approved,
            Utc::now(),
        )
        .await
        .unwrap();
    assert!(applied);
    let loaded = storage.get_suggestion(&suggestion.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, SuggestionStatus::Approved);

    let missing = storage
        .update_status_if(
            "missing",
            SuggestionStatus::PendingReview,
            SuggestionStatus::Approved,
            Utc::now(),
        )
        .await
        .unwrap();
    assert!(!missing);
}

#[tokio::test]
async fn test_record_and_read_errors() {
    let (storage, _dir) = create_temp_storage().await;
    storage
        .record_error(ErrorLogEntry::new("first", "/api/transcribe", "POST"))
        .await;
    storage
        .record_error(ErrorLogEntry::new("second", "/api/suggestions", "GET"))
        .await;

    let errors = storage.recent_errors(10).await.unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].error, "second");
    assert_eq!(errors[1].endpoint, "/api/transcribe");

    assert_eq!(storage.recent_errors(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_ping_and_backend_name() {
    let (storage, _dir) = create_temp_storage().await;
    storage.ping().await.unwrap();
    assert_eq!(storage.backend_name(), "sqlite");
}

#[tokio::test]
async fn test_unsupported_url_rejected() {
    let config = DatabaseConfig {
        database_url: "mongodb://localhost:27017/kaizen".into(),
        ..Default::default()
    };
    let err = SeaOrmStorage::new(&config).await.err().unwrap();
    assert_eq!(err.code(), "E001");
}

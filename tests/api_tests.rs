//! HTTP API tests
//!
//! 完整的 actix App（中间件 + /api 路由），sqlite 临时库，
//! Whisper / Anthropic 用 wiremock 代替。

use std::path::PathBuf;
use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test};
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kaizen_voice::api::middleware::{ErrorLogMiddleware, RequestIdMiddleware};
use kaizen_voice::api::services::{AppStartTime, WELCOME_MESSAGE};
use kaizen_voice::config::StaticConfig;
use kaizen_voice::domain::{
    Analysis, KaizenSuggestion, LeanCategory, SubmissionMetadata, SuggestionLevel,
};
use kaizen_voice::runtime::lifetime::startup::build_context;
use kaizen_voice::runtime::modes::server::configure_app;
use kaizen_voice::services::SuggestionService;
use kaizen_voice::storage::SeaOrmStorage;

const BOUNDARY: &str = "----kaizen-test-boundary";
const UPLOAD_LIMIT: usize = 1024;

struct TestEnv {
    _dir: TempDir,
    archive_dir: PathBuf,
    whisper: MockServer,
    claude: MockServer,
    storage: Arc<SeaOrmStorage>,
    service: Arc<SuggestionService>,
}

async fn setup(enforce_lifecycle: bool) -> TestEnv {
    let dir = TempDir::new().unwrap();
    let whisper = MockServer::start().await;
    let claude = MockServer::start().await;
    let archive_dir = dir.path().join("recordings");

    let mut config = StaticConfig::default();
    config.database.database_url =
        format!("sqlite://{}?mode=rwc", dir.path().join("api.db").display());
    config.transcription.base_url = format!("{}/v1", whisper.uri());
    config.transcription.api_key = "sk-test".into();
    config.classifier.base_url = format!("{}/v1", claude.uri());
    config.classifier.api_key = "sk-ant-test".into();
    config.classifier.model = "claude-test".into();
    config.archive.directory = archive_dir.display().to_string();
    config.suggestions.enforce_lifecycle = enforce_lifecycle;

    let context = build_context(&config).await.unwrap();

    TestEnv {
        _dir: dir,
        archive_dir,
        whisper,
        claude,
        storage: context.storage,
        service: context.suggestion_service,
    }
}

macro_rules! init_app {
    ($env:expr) => {{
        let storage = $env.storage.clone();
        let service = $env.service.clone();
        test::init_service(
            App::new()
                .wrap(ErrorLogMiddleware)
                .wrap(RequestIdMiddleware)
                .configure(move |cfg| {
                    configure_app(cfg, storage, service, AppStartTime::now(), UPLOAD_LIMIT)
                }),
        )
        .await
    }};
}

fn multipart_body(audio: Option<(&str, &[u8])>, metadata: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some((file_name, bytes)) = audio {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"audio\"; filename=\"{file_name}\"\r\nContent-Type: audio/webm\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(metadata) = metadata {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"metadata\"\r\n\r\n{metadata}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn transcribe_request(body: Vec<u8>) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/transcribe")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
}

async fn mock_whisper(env: &TestEnv, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(path("/v1/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(&env.whisper)
        .await;
}

async fn mock_claude_text(env: &TestEnv, text: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": text}],
            "model": "claude-test",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 1, "output_tokens": 1}
        })))
        .mount(&env.claude)
        .await;
}

async fn seed_suggestion(env: &TestEnv, job_id: &str) -> String {
    let suggestion = KaizenSuggestion::new(
        job_id.to_string(),
        "Label the torque wrenches by size".to_string(),
        Analysis {
            summary: "Label wrenches.".into(),
            lean_category: LeanCategory::Motion,
            suggestion_level: SuggestionLevel::JustDoIt,
            reasoning: "Less searching.".into(),
        },
        SubmissionMetadata::default(),
        None,
    );
    env.storage.insert_suggestion(&suggestion).await.unwrap()
}

fn status_request(id: &str, body: Value) -> test::TestRequest {
    test::TestRequest::post()
        .uri(&format!("/api/suggestions/{}/status", id))
        .set_json(body)
}

// =============================================================================
// Root & health
// =============================================================================

#[actix_rt::test]
async fn test_root_message() {
    let env = setup(true).await;
    let app = init_app!(env);

    for uri in ["/api", "/api/"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], WELCOME_MESSAGE);
    }
}

#[actix_rt::test]
async fn test_health_reports_components() {
    let env = setup(true).await;
    let app = init_app!(env);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/health").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["transcription"], "healthy");
    assert_eq!(body["classification"], "healthy");
    assert!(body["timestamp"].is_string());
    assert!(body["uptime"].is_u64());
}

#[actix_rt::test]
async fn test_incoming_request_id_is_echoed() {
    let env = setup(true).await;
    let app = init_app!(env);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/health")
            .insert_header(("X-Request-ID", "trace-abc_123"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.headers().get("x-request-id").unwrap(), "trace-abc_123");

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/health")
            .insert_header(("X-Request-ID", "not valid!"))
            .to_request(),
    )
    .await;
    assert_ne!(resp.headers().get("x-request-id").unwrap(), "not valid!");
}

// =============================================================================
// Transcribe
// =============================================================================

#[actix_rt::test]
async fn test_transcribe_full_pipeline() {
    let env = setup(true).await;
    mock_whisper(&env, 200, json!({"text": "Forklifts keep crossing the walkway to reach dock 3."})).await;
    mock_claude_text(
        &env,
        r#"{"summary": "Reroute forklifts.", "lean_category": "Transportation", "suggestion_level": "Safety", "reasoning": "Pedestrian risk."}"#,
    )
    .await;
    let app = init_app!(env);

    let body = multipart_body(
        Some(("note.webm", b"fake-webm-bytes")),
        Some(r#"{"location": "Dock 3", "shift": "Day", "associate_name": "Rae"}"#),
    );
    let resp = test::call_service(&app, transcribe_request(body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["lean_category"], "Transportation");
    assert_eq!(body["suggestion_level"], "Safety");
    assert_eq!(body["summary"], "Reroute forklifts.");
    let job_id = body["job_id"].as_str().unwrap().to_string();
    assert!(job_id.starts_with("kaizen_"));

    // 录音已存档
    assert!(env.archive_dir.join("audio").join(format!("{}.webm", job_id)).exists());

    let document_id = body["document_id"].as_str().unwrap();
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/suggestions/{}", document_id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let stored: Value = test::read_body_json(resp).await;
    assert_eq!(stored["job_id"], job_id.as_str());
    assert_eq!(stored["location"], "Dock 3");
    assert_eq!(stored["shift"], "Day");
    assert_eq!(stored["associate_name"], "Rae");
    assert_eq!(stored["status"], "pending_review");
    assert_eq!(stored["audio_key"], format!("audio/{}.webm", job_id));
}

#[actix_rt::test]
async fn test_transcribe_falls_back_when_classifier_fails() {
    let env = setup(true).await;
    mock_whisper(&env, 200, json!({"text": "Too many clicks to print a label."})).await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .mount(&env.claude)
        .await;
    let app = init_app!(env);

    let body = multipart_body(Some(("note.webm", b"bytes")), None);
    let resp = test::call_service(&app, transcribe_request(body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["summary"], "Too many clicks to print a label.");
    assert_eq!(body["lean_category"], "Motion");
    assert_eq!(body["suggestion_level"], "Needs Review");
    assert!(
        body["reasoning"]
            .as_str()
            .unwrap()
            .starts_with("AI analysis unavailable: ")
    );
}

#[actix_rt::test]
async fn test_transcribe_requires_audio() {
    let env = setup(true).await;
    let app = init_app!(env);

    let body = multipart_body(None, Some("{}"));
    let resp = test::call_service(&app, transcribe_request(body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Audio file is required");

    // 4xx 不记录错误日志
    assert!(env.storage.recent_errors(10).await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_transcribe_rejects_oversized_audio() {
    let env = setup(true).await;
    let app = init_app!(env);

    let audio = vec![b'a'; UPLOAD_LIMIT * 4];
    let body = multipart_body(Some(("big.webm", &audio)), None);
    let resp = test::call_service(&app, transcribe_request(body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[actix_rt::test]
async fn test_transcription_failure_is_logged() {
    let env = setup(true).await;
    mock_whisper(&env, 500, json!({"error": "boom"})).await;
    let app = init_app!(env);

    let body = multipart_body(Some(("note.webm", b"bytes")), None);
    let resp = test::call_service(&app, transcribe_request(body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .starts_with("Processing failed: ")
    );

    let errors = env.storage.recent_errors(10).await.unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].endpoint, "/api/transcribe");
    assert_eq!(errors[0].method, "POST");
    assert!(errors[0].error.starts_with("Processing failed: "));

    // 失败的录音不入库
    let total = env.service.list(Default::default()).await.unwrap().total;
    assert_eq!(total, 0);
}

// =============================================================================
// Suggestions
// =============================================================================

#[actix_rt::test]
async fn test_list_and_filters() {
    let env = setup(true).await;
    seed_suggestion(&env, "kaizen_a").await;
    seed_suggestion(&env, "kaizen_b").await;
    let app = init_app!(env);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/suggestions").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["skip"], 0);
    assert_eq!(body["limit"], 20);
    assert_eq!(body["suggestions"].as_array().unwrap().len(), 2);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/suggestions?status=approved&lean_category=Motion")
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], 0);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/suggestions?limit=1000&skip=1")
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["limit"], 100);
    assert_eq!(body["suggestions"].as_array().unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_list_rejects_bad_filters() {
    let env = setup(true).await;
    let app = init_app!(env);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/suggestions?status=done")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["detail"],
        "Invalid status. Must be one of: pending_review, approved, rejected, implemented"
    );

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/suggestions?limit=many")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_get_unknown_suggestion() {
    let env = setup(true).await;
    let app = init_app!(env);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/suggestions/does-not-exist")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Suggestion not found");
    assert_eq!(body["code"], "E006");
}

#[actix_rt::test]
async fn test_status_lifecycle() {
    let env = setup(true).await;
    let id = seed_suggestion(&env, "kaizen_life").await;
    let app = init_app!(env);

    let resp = test::call_service(&app, status_request(&id, json!({"status": "approved"})).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Status updated to approved");

    let resp = test::call_service(
        &app,
        status_request(&id, json!({"status": "pending_review"})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Cannot change status from approved to pending_review");

    let resp = test::call_service(&app, status_request(&id, json!({"status": "implemented"})).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let stored = env.service.get(&id).await.unwrap();
    assert_eq!(stored.status.as_str(), "implemented");
    assert!(stored.last_updated.is_some());
}

#[actix_rt::test]
async fn test_status_validation_errors() {
    let env = setup(true).await;
    let id = seed_suggestion(&env, "kaizen_bad").await;
    let app = init_app!(env);

    let resp = test::call_service(&app, status_request(&id, json!({"status": "done"})).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(&app, status_request(&id, json!({})).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
        &app,
        status_request("missing-id", json!({"status": "approved"})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_status_free_form_when_lifecycle_disabled() {
    let env = setup(false).await;
    let id = seed_suggestion(&env, "kaizen_free").await;
    let app = init_app!(env);

    let resp = test::call_service(&app, status_request(&id, json!({"status": "implemented"})).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        status_request(&id, json!({"status": "pending_review"})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        status_request("missing-id", json!({"status": "approved"})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_status_rejects_malformed_json() {
    let env = setup(true).await;
    let id = seed_suggestion(&env, "kaizen_json").await;
    let app = init_app!(env);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/api/suggestions/{}/status", id))
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("not json")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "E005");
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body: ")
    );

    // 状态未被改动
    let stored = env.service.get(&id).await.unwrap();
    assert_eq!(stored.status.as_str(), "pending_review");
}

#[actix_rt::test]
async fn test_health_unavailable_when_database_closed() {
    let env = setup(true).await;
    let app = init_app!(env);

    env.storage.get_db().clone().close().await.unwrap();

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/health").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "E002");
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .starts_with("Service unhealthy: ")
    );
}

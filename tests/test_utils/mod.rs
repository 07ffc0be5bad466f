//! Test utilities for integration tests
use std::env;
use std::fs;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use axum::Router;

use mailsweep::api::AppState;
use mailsweep::api::app;
use mailsweep::core::AppConfig;
use mailsweep::core::db::{async_db, initialize_db};

/// Config with every external hostname pointed at the given mock
/// server. Pacing is zeroed so tests don't sleep.
pub fn test_config(mock_hostname: &str, db_path: &str) -> AppConfig {
    AppConfig {
        db_path: db_path.to_string(),
        gmail_api_hostname: mock_hostname.to_string(),
        google_oauth_hostname: mock_hostname.to_string(),
        gmail_client_id: String::from("test_client_id"),
        gmail_client_secret: String::from("test_client_secret"),
        openai_api_hostname: mock_hostname.to_string(),
        openai_api_key: String::from("test-api-key"),
        openai_model: String::from("gpt-4.1-mini"),
        classify_batch_size: 2,
        classify_batch_pause_ms: 0,
        trash_batch_size: 2,
    }
}

/// Creates a test application router backed by a scratch sqlite db.
///
/// `refresh_token` seeds the auth table; pass `None` for the
/// signed-out state. All outbound calls go to `mock_hostname`.
pub async fn test_app(mock_hostname: &str, refresh_token: Option<&str>) -> Router {
    // Unique scratch directory per test
    let ts = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_nanos()
        .to_string();
    let dir = env::temp_dir().join(format!("mailsweep-test-{}", ts));
    fs::create_dir_all(&dir).expect("Failed to create test directory");
    let db_path = dir.to_str().unwrap().to_string();

    let db = async_db(&db_path)
        .await
        .expect("Failed to connect to async db");
    let refresh_token = refresh_token.map(|t| t.to_string());
    db.call(move |conn| {
        initialize_db(conn).expect("Failed to initialize db");
        if let Some(token) = refresh_token {
            conn.execute(
                "INSERT INTO auth (id, service, refresh_token) VALUES (?1, 'gmail', ?2)",
                ("me@example.com", token),
            )
            .expect("Failed to seed refresh token");
        }
        Ok(())
    })
    .await
    .unwrap();

    let config = test_config(mock_hostname, &db_path);
    let app_state = AppState::new(db, config);
    app(Arc::new(RwLock::new(app_state)))
}

/// Register the standard OAuth token mock returning a fresh access
/// token.
pub async fn mock_token_endpoint(server: &mut mockito::ServerGuard) -> mockito::Mock {
    server
        .mock("POST", "/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token": "mock_access_token", "expires_in": 3600}"#)
        .create_async()
        .await
}

/// A full-format Gmail message with a multipart/alternative body
pub fn gmail_message_json(id: &str, subject: &str, unread: bool) -> String {
    let labels = if unread {
        r#"["INBOX", "UNREAD"]"#
    } else {
        r#"["INBOX"]"#
    };
    format!(
        r#"{{
            "id": "{id}",
            "snippet": "snippet {id}",
            "labelIds": {labels},
            "payload": {{
                "mimeType": "multipart/alternative",
                "headers": [
                    {{"name": "From", "value": "promo@example.com"}},
                    {{"name": "Subject", "value": "{subject}"}},
                    {{"name": "Date", "value": "Mon, 3 Feb 2025 10:00:00 +0000"}}
                ],
                "parts": [
                    {{"mimeType": "text/plain", "body": {{"size": 2, "data": "aGk="}}}},
                    {{"mimeType": "text/html", "body": {{"size": 9, "data": "PGI-aGk8L2I-"}}}}
                ]
            }}
        }}"#
    )
}

/// A canned classifier verdict response
pub fn completion_json(is_marketing: bool, confidence: f32, reason: &str) -> String {
    let verdict = serde_json::json!({
        "isMarketing": is_marketing,
        "confidence": confidence,
        "reason": reason
    })
    .to_string();
    serde_json::json!({
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": verdict},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

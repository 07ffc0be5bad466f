//! Google OAuth2: authorization-code exchange, refresh-token flow,
//! and a cached access token provider shared by all outbound calls.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_rusqlite::Connection;

use crate::core::AppConfig;

/// Refresh slightly before the provider-reported expiry to avoid
/// sending a token that dies in flight.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No connected account. Run `mailsweep auth` to sign in.")]
    NotConnected,
    #[error("Token refresh rejected: {0}")]
    RefreshRejected(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Db(#[from] tokio_rusqlite::Error),
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

/// Exchange an authorization code for tokens. Used once per sign-in
/// by the `auth` CLI command.
pub async fn exchange_code_for_token(
    oauth_hostname: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
) -> Result<TokenResponse, AuthError> {
    let client = Client::new();
    let url = format!("{}/token", oauth_hostname.trim_end_matches("/"));
    let res = client
        .post(&url)
        .form(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(AuthError::RefreshRejected(format!("{} ({})", status, text)));
    }
    let token: TokenResponse =
        serde_json::from_str(&text).map_err(|e| AuthError::RefreshRejected(e.to_string()))?;
    Ok(token)
}

/// Exchange a refresh token for a fresh access token
pub async fn refresh_access_token(
    oauth_hostname: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<TokenResponse, AuthError> {
    let client = Client::new();
    let url = format!("{}/token", oauth_hostname.trim_end_matches("/"));
    let res = client
        .post(&url)
        .form(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .send()
        .await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(AuthError::RefreshRejected(format!("{} ({})", status, text)));
    }
    let token: TokenResponse =
        serde_json::from_str(&text).map_err(|e| AuthError::RefreshRejected(e.to_string()))?;
    Ok(token)
}

/// Look up the stored refresh token. Single-user tool: the most
/// recently connected account wins.
pub async fn find_refresh_token(db: &Connection) -> Result<Option<String>, tokio_rusqlite::Error> {
    db.call(|conn| {
        let mut stmt = conn.prepare(
            "SELECT refresh_token FROM auth WHERE service = 'gmail' ORDER BY rowid DESC LIMIT 1",
        )?;
        let mut rows = stmt.query([])?;
        let token = match rows.next()? {
            Some(row) => Some(row.get::<_, String>(0)?),
            None => None,
        };
        Ok(token)
    })
    .await
}

#[derive(Debug, Clone)]
struct Credential {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Caches the current access token and refreshes it in place when
/// expired. The async mutex is held across the refresh await so
/// concurrent callers wait on one in-flight refresh instead of
/// issuing duplicates.
#[derive(Clone, Default)]
pub struct TokenProvider {
    cached: Arc<Mutex<Option<Credential>>>,
}

impl TokenProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a valid access token, refreshing at most once per call.
    pub async fn get_valid_token(
        &self,
        db: &Connection,
        config: &AppConfig,
    ) -> Result<String, AuthError> {
        let mut cached = self.cached.lock().await;

        if let Some(credential) = cached.as_ref()
            && Utc::now() < credential.expires_at - Duration::seconds(EXPIRY_SKEW_SECS)
        {
            return Ok(credential.access_token.clone());
        }

        let refresh_token = find_refresh_token(db)
            .await?
            .ok_or(AuthError::NotConnected)?;

        let token = refresh_access_token(
            &config.google_oauth_hostname,
            &config.gmail_client_id,
            &config.gmail_client_secret,
            &refresh_token,
        )
        .await?;

        let expires_at = Utc::now() + Duration::seconds(token.expires_in.unwrap_or(3600));
        let access_token = token.access_token.clone();
        *cached = Some(Credential {
            access_token: token.access_token,
            expires_at,
        });

        Ok(access_token)
    }

    /// Drop the cached credential. Called when the mail API rejects a
    /// token mid-request so the next call performs a fresh refresh.
    pub async fn invalidate(&self) {
        let mut cached = self.cached.lock().await;
        *cached = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::{async_db, initialize_db};

    fn test_config(oauth_hostname: &str) -> AppConfig {
        AppConfig {
            db_path: String::from("unused"),
            gmail_api_hostname: String::from("unused"),
            google_oauth_hostname: oauth_hostname.to_string(),
            gmail_client_id: String::from("test_client_id"),
            gmail_client_secret: String::from("test_client_secret"),
            openai_api_hostname: String::from("unused"),
            openai_api_key: String::from("unused"),
            openai_model: String::from("unused"),
            classify_batch_size: 2,
            classify_batch_pause_ms: 0,
            trash_batch_size: 10,
        }
    }

    async fn seeded_db(dir: &std::path::Path, refresh_token: Option<&str>) -> Connection {
        let db = async_db(dir.to_str().unwrap()).await.unwrap();
        let refresh_token = refresh_token.map(|t| t.to_string());
        db.call(move |conn| {
            initialize_db(conn).unwrap();
            if let Some(token) = refresh_token {
                conn.execute(
                    "INSERT INTO auth (id, service, refresh_token) VALUES (?1, 'gmail', ?2)",
                    ("me@example.com", token),
                )
                .unwrap();
            }
            Ok(())
        })
        .await
        .unwrap();
        db
    }

    #[tokio::test]
    async fn test_get_valid_token_refreshes_once_and_caches() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "fresh_token", "expires_in": 3600}"#)
            .expect(1)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(dir.path(), Some("refresh_123")).await;
        let config = test_config(&server.url());

        let provider = TokenProvider::new();
        let first = provider.get_valid_token(&db, &config).await.unwrap();
        let second = provider.get_valid_token(&db, &config).await.unwrap();

        // The second call is served from the cache
        mock.assert_async().await;
        assert_eq!(first, "fresh_token");
        assert_eq!(second, "fresh_token");
    }

    #[tokio::test]
    async fn test_missing_refresh_token_is_not_connected() {
        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(dir.path(), None).await;
        let config = test_config("http://127.0.0.1:1");

        let provider = TokenProvider::new();
        let err = provider.get_valid_token(&db, &config).await.unwrap_err();
        assert!(matches!(err, AuthError::NotConnected));
    }

    #[tokio::test]
    async fn test_rejected_refresh_surfaces_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error": "invalid_grant"}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(dir.path(), Some("revoked_token")).await;
        let config = test_config(&server.url());

        let provider = TokenProvider::new();
        let err = provider.get_valid_token(&db, &config).await.unwrap_err();
        assert!(matches!(err, AuthError::RefreshRejected(_)));
    }

    #[tokio::test]
    async fn test_invalidate_forces_new_refresh() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "fresh_token", "expires_in": 3600}"#)
            .expect(2)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let db = seeded_db(dir.path(), Some("refresh_123")).await;
        let config = test_config(&server.url());

        let provider = TokenProvider::new();
        provider.get_valid_token(&db, &config).await.unwrap();
        provider.invalidate().await;
        provider.get_valid_token(&db, &config).await.unwrap();

        mock.assert_async().await;
    }
}

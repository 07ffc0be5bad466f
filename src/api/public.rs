//! Public API types

use axum::response::{IntoResponse, Json, Response};
use http::StatusCode;
use serde_json::json;

use crate::google::gmail::GmailError;
use crate::google::oauth::AuthError;
use crate::pipeline::mutate::TrashError;

/// Structured API error. The `code` is part of the contract: clients
/// force a re-authentication on UNAUTHENTICATED and TOKEN_EXPIRED.
pub enum ApiError {
    Unauthenticated(String),
    TokenExpired(String),
    InvalidRequest(String),
    Internal(anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated(_) | ApiError::TokenExpired(_) => StatusCode::UNAUTHORIZED,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated(_) => "UNAUTHENTICATED",
            ApiError::TokenExpired(_) => "TOKEN_EXPIRED",
            ApiError::InvalidRequest(_) => "INVALID_REQUEST",
            ApiError::Internal(_) => "UNKNOWN_ERROR",
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Unauthenticated(msg)
            | ApiError::TokenExpired(msg)
            | ApiError::InvalidRequest(msg) => msg.clone(),
            ApiError::Internal(err) => format!("Something went wrong: {}", err),
        }
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Always log the error
        tracing::error!("{} {}", self.code(), self.message());

        (
            self.status(),
            Json(json!({"error": self.message(), "code": self.code()})),
        )
            .into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::NotConnected => ApiError::Unauthenticated(err.to_string()),
            AuthError::RefreshRejected(_) => ApiError::TokenExpired(err.to_string()),
            AuthError::Http(_) | AuthError::Db(_) => ApiError::Internal(err.into()),
        }
    }
}

impl From<GmailError> for ApiError {
    fn from(err: GmailError) -> Self {
        match err {
            GmailError::Unauthorized(_) => ApiError::TokenExpired(err.to_string()),
            _ => ApiError::Internal(err.into()),
        }
    }
}

impl From<TrashError> for ApiError {
    fn from(err: TrashError) -> Self {
        match err.source {
            GmailError::Unauthorized(_) => ApiError::TokenExpired(err.to_string()),
            _ => ApiError::Internal(err.into()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl From<tokio_rusqlite::Error> for ApiError {
    fn from(err: tokio_rusqlite::Error) -> Self {
        ApiError::Internal(err.into())
    }
}

// Re-export public types from each route

pub mod emails {
    pub use crate::api::routes::emails::public::*;
}

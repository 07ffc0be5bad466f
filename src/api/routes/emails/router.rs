//! Router for the emails API

use std::sync::{Arc, RwLock};

use axum::{Router, extract::State, response::Json};
use axum_extra::extract::Query;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::google::gmail::GmailError;
use crate::google::oauth::TokenProvider;
use crate::pipeline::{classify, fetch, mutate};

type SharedState = Arc<RwLock<AppState>>;

const DEFAULT_PAGE_SIZE: u32 = 5;

/// Clone the pieces a handler needs out of the shared state so the
/// std lock is never held across an await.
fn request_context(
    state: &SharedState,
) -> (
    tokio_rusqlite::Connection,
    crate::core::AppConfig,
    TokenProvider,
) {
    let state = state.read().expect("Unable to read shared state");
    (
        state.db.clone(),
        state.config.clone(),
        state.token_provider.clone(),
    )
}

/// Drop the cached access token when Gmail rejected it, so the next
/// request performs a fresh refresh instead of replaying a dead token.
async fn invalidate_on_auth_loss(token_provider: &TokenProvider, err: &GmailError) {
    if matches!(err, GmailError::Unauthorized(_)) {
        token_provider.invalidate().await;
    }
}

/// GET /emails?page=&limit=
///
/// Fetches one page of messages, classifies them, merges them into
/// the working set, and returns the records added by the merge.
async fn list_emails_handler(
    State(state): State<SharedState>,
    Query(params): Query<public::EmailListQuery>,
) -> Result<Json<public::EmailListResponse>, ApiError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);

    let (db, config, token_provider) = request_context(&state);
    let access_token = token_provider.get_valid_token(&db, &config).await?;

    // A fresh scan invalidates the working set
    if page == 1 {
        state
            .write()
            .expect("Unable to write shared state")
            .working_set
            .reset();
    }

    let (emails, has_more) =
        match fetch::list_page(&config.gmail_api_hostname, &access_token, page, limit).await {
            Ok(page) => page,
            Err(err) => {
                invalidate_on_auth_loss(&token_provider, &err).await;
                return Err(err.into());
            }
        };

    let analyzed = classify::classify_all(emails, &config).await;

    let added = state
        .write()
        .expect("Unable to write shared state")
        .working_set
        .merge(analyzed);

    Ok(Json(public::EmailListResponse {
        emails: added,
        next_page: page + 1,
        has_more,
    }))
}

/// POST /emails/delete
///
/// Validation runs before the credential lookup: a bad request never
/// touches the network.
async fn delete_emails_handler(
    State(state): State<SharedState>,
    Json(body): Json<public::DeleteEmailsRequest>,
) -> Result<Json<public::DeleteEmailsResponse>, ApiError> {
    if body.email_ids.is_empty() {
        return Err(ApiError::InvalidRequest(
            "Invalid or empty email IDs".to_string(),
        ));
    }

    let (db, config, token_provider) = request_context(&state);
    let access_token = token_provider.get_valid_token(&db, &config).await?;

    let deleted_count = match mutate::trash_all(
        &config.gmail_api_hostname,
        &access_token,
        &body.email_ids,
        config.trash_batch_size,
    )
    .await
    {
        Ok(count) => count,
        Err(err) => {
            // Batches that committed before the failure are gone from
            // the mailbox; drop them from the working set too
            if err.deleted > 0 {
                state
                    .write()
                    .expect("Unable to write shared state")
                    .working_set
                    .remove(&body.email_ids[..err.deleted]);
            }
            invalidate_on_auth_loss(&token_provider, &err.source).await;
            return Err(err.into());
        }
    };

    state
        .write()
        .expect("Unable to write shared state")
        .working_set
        .remove(&body.email_ids);

    Ok(Json(public::DeleteEmailsResponse {
        success: true,
        deleted_count,
    }))
}

/// POST /emails/mark-read
async fn mark_read_handler(
    State(state): State<SharedState>,
    Json(body): Json<public::MarkReadRequest>,
) -> Result<Json<public::MarkReadResponse>, ApiError> {
    if body.email_id.is_empty() {
        return Err(ApiError::InvalidRequest("Email ID is required".to_string()));
    }

    let (db, config, token_provider) = request_context(&state);
    let access_token = token_provider.get_valid_token(&db, &config).await?;

    if let Err(err) =
        mutate::mark_read(&config.gmail_api_hostname, &access_token, &body.email_id).await
    {
        invalidate_on_auth_loss(&token_provider, &err).await;
        return Err(err.into());
    }

    state
        .write()
        .expect("Unable to write shared state")
        .working_set
        .mark_read(&body.email_id);

    Ok(Json(public::MarkReadResponse { success: true }))
}

/// Create the emails router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", axum::routing::get(list_emails_handler))
        .route("/delete", axum::routing::post(delete_emails_handler))
        .route("/mark-read", axum::routing::post(mark_read_handler))
}

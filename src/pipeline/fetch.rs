//! Paginated mailbox fetch: replays the opaque continuation token
//! chain to reach the requested page, then fans out detail fetches.

use chrono::Utc;
use futures_util::future::join_all;

use super::{EmailRecord, mime};
use crate::google::gmail::{self, GmailError};

/// Fetch one page of fully assembled emails.
///
/// Gmail only paginates forward, so reaching page N costs N list
/// calls, discarding every continuation token but the last. O(N)
/// round trips, fine for the handful of pages a user pages through.
///
/// The boolean is true iff Gmail returned a continuation token for
/// the page after this one.
pub async fn list_page(
    api_hostname: &str,
    access_token: &str,
    page: u32,
    limit: u32,
) -> Result<(Vec<EmailRecord>, bool), GmailError> {
    let page = page.max(1);
    let mut message_refs = Vec::new();
    let mut page_token: Option<String> = None;

    for current_page in 1..=page {
        let list =
            gmail::list_messages(api_hostname, access_token, limit, page_token.as_deref()).await?;
        if current_page == page {
            message_refs = list.messages.unwrap_or_default();
        }
        page_token = list.next_page_token;

        // The token chain ran out before the target page
        if page_token.is_none() && current_page < page {
            return Ok((Vec::new(), false));
        }
    }

    let has_more = page_token.is_some();

    // Fan out the detail fetches; join_all preserves request order so
    // the assembled page follows the id list, not completion order.
    let details = join_all(
        message_refs
            .iter()
            .map(|m| fetch_record(api_hostname, access_token, &m.id)),
    )
    .await;

    let mut emails = Vec::with_capacity(details.len());
    for (message_ref, result) in message_refs.iter().zip(details) {
        match result {
            Ok(record) => emails.push(record),
            // A stale token is about the request, not the item
            Err(err @ GmailError::Unauthorized(_)) => return Err(err),
            Err(err) => {
                tracing::warn!("Dropping message {}: {}", message_ref.id, err);
            }
        }
    }

    Ok((emails, has_more))
}

/// Fetch and assemble a single email record
async fn fetch_record(
    api_hostname: &str,
    access_token: &str,
    id: &str,
) -> Result<EmailRecord, GmailError> {
    let message = gmail::get_message(api_hostname, access_token, id, "full").await?;

    let from = message.header("From").unwrap_or("Unknown").to_string();
    let subject = message.header("Subject").unwrap_or("No Subject").to_string();
    let date = message
        .header("Date")
        .map(|d| d.to_string())
        .unwrap_or_else(|| Utc::now().to_rfc3339());
    let body = mime::decode_body(message.payload.as_ref());

    Ok(EmailRecord {
        id: message.id.clone(),
        from,
        subject,
        date,
        body_html: body.html,
        text: body.text,
        snippet: message.snippet.clone().unwrap_or_default(),
        is_read: message.is_read(),
        analysis: None,
    })
}

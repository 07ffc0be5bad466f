//! Typed client for the Gmail REST API: paginated listing, full
//! message retrieval, label modification, and trash.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

pub const UNREAD_LABEL: &str = "UNREAD";

/// Message and part structures from the Gmail API documentation
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MessageRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct ListMessagesResponse {
    pub messages: Option<Vec<MessageRef>>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub snippet: Option<String>,
    pub payload: Option<MessagePart>,
    #[serde(rename = "labelIds")]
    pub label_ids: Option<Vec<String>>,
}

/// A node in the (recursive) MIME part tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePart {
    #[serde(rename = "mimeType")]
    pub mimetype: Option<String>,
    pub headers: Option<Vec<MessageHeader>>,
    pub body: Option<MessagePartBody>,
    pub parts: Option<Vec<MessagePart>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePartBody {
    #[serde(rename = "attachmentId")]
    pub attachment_id: Option<String>,
    pub size: Option<u64>,
    // Base64url encoded
    pub data: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageHeader {
    pub name: String,
    pub value: String,
}

impl Message {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.payload
            .as_ref()?
            .headers
            .as_ref()?
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    pub fn is_read(&self) -> bool {
        !self
            .label_ids
            .as_ref()
            .is_some_and(|labels| labels.iter().any(|l| l == UNREAD_LABEL))
    }
}

#[derive(Debug, Error)]
pub enum GmailError {
    /// The access token was rejected mid-request. Callers must treat
    /// this as "re-authentication required", not retry.
    #[error("Gmail rejected the access token: {0}")]
    Unauthorized(String),
    #[error("Gmail API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("Unexpected Gmail response: {0}")]
    Decode(#[from] serde_json::Error),
}

async fn check_response(res: reqwest::Response) -> Result<String, GmailError> {
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if status.as_u16() == 401 {
        return Err(GmailError::Unauthorized(text));
    }
    if !status.is_success() {
        return Err(GmailError::Api {
            status: status.as_u16(),
            body: text,
        });
    }
    Ok(text)
}

/// List one page of message ids. Gmail only paginates forward via the
/// opaque `pageToken` so callers replay list calls to reach later pages.
pub async fn list_messages(
    api_hostname: &str,
    access_token: &str,
    max_results: u32,
    page_token: Option<&str>,
) -> Result<ListMessagesResponse, GmailError> {
    let client = Client::new();
    let mut url = format!(
        "{}/gmail/v1/users/me/messages?maxResults={}",
        api_hostname.trim_end_matches("/"),
        max_results
    );
    if let Some(token) = page_token {
        url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
    }
    let res = client.get(&url).bearer_auth(access_token).send().await?;
    let text = check_response(res).await?;
    let list: ListMessagesResponse = serde_json::from_str(&text)?;
    Ok(list)
}

/// Fetch a single message. `format` is `full` for the whole MIME tree
/// or `minimal` for just ids and labels.
pub async fn get_message(
    api_hostname: &str,
    access_token: &str,
    id: &str,
    format: &str,
) -> Result<Message, GmailError> {
    let client = Client::new();
    let url = format!(
        "{}/gmail/v1/users/me/messages/{}?format={}",
        api_hostname.trim_end_matches("/"),
        id,
        format
    );
    let res = client.get(&url).bearer_auth(access_token).send().await?;
    let text = check_response(res).await?;
    let message: Message = serde_json::from_str(&text)?;
    Ok(message)
}

/// Remove labels from a message
pub async fn modify_message(
    api_hostname: &str,
    access_token: &str,
    id: &str,
    remove_label_ids: &[&str],
) -> Result<(), GmailError> {
    let client = Client::new();
    let url = format!(
        "{}/gmail/v1/users/me/messages/{}/modify",
        api_hostname.trim_end_matches("/"),
        id
    );
    let res = client
        .post(&url)
        .bearer_auth(access_token)
        .json(&json!({ "removeLabelIds": remove_label_ids }))
        .send()
        .await?;
    check_response(res).await?;
    Ok(())
}

/// Move a message to the trash
pub async fn trash_message(
    api_hostname: &str,
    access_token: &str,
    id: &str,
) -> Result<(), GmailError> {
    let client = Client::new();
    let url = format!(
        "{}/gmail/v1/users/me/messages/{}/trash",
        api_hostname.trim_end_matches("/"),
        id
    );
    let res = client.post(&url).bearer_auth(access_token).send().await?;
    check_response(res).await?;
    Ok(())
}

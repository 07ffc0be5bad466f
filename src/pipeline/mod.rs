//! The email analysis pipeline: paginated fetch, MIME body decoding,
//! batched classification, and mailbox mutations.

pub mod classify;
pub mod fetch;
pub mod mime;
pub mod mutate;
pub mod working_set;

use serde::{Deserialize, Serialize};

/// Classification result attached to an email. Absent until a
/// classification run completes for the record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Verdict {
    #[serde(rename = "isMarketing")]
    pub is_marketing: bool,
    pub confidence: f32,
    pub reason: String,
}

impl Verdict {
    /// Fail-open default: uncertain emails are kept, never
    /// auto-deleted.
    pub fn fail_open(reason: &str) -> Self {
        Self {
            is_marketing: false,
            confidence: 0.0,
            reason: reason.to_string(),
        }
    }
}

/// A fully assembled email as the UI consumes it. `body` is the html
/// channel, `text` the plain-text channel; both are always populated
/// when any decodable content existed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRecord {
    pub id: String,
    pub from: String,
    pub subject: String,
    pub date: String,
    #[serde(rename = "body")]
    pub body_html: String,
    pub text: String,
    pub snippet: String,
    #[serde(rename = "isRead")]
    pub is_read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Verdict>,
}

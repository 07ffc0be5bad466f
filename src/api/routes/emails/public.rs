//! Public types for the emails API
use serde::{Deserialize, Serialize};

use crate::pipeline::EmailRecord;

#[derive(Deserialize)]
pub struct EmailListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Serialize)]
pub struct EmailListResponse {
    pub emails: Vec<EmailRecord>,
    #[serde(rename = "nextPage")]
    pub next_page: u32,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

#[derive(Deserialize)]
pub struct DeleteEmailsRequest {
    #[serde(rename = "emailIds", default)]
    pub email_ids: Vec<String>,
}

#[derive(Serialize)]
pub struct DeleteEmailsResponse {
    pub success: bool,
    #[serde(rename = "deletedCount")]
    pub deleted_count: usize,
}

#[derive(Deserialize)]
pub struct MarkReadRequest {
    #[serde(rename = "emailId", default)]
    pub email_id: String,
}

#[derive(Serialize)]
pub struct MarkReadResponse {
    pub success: bool,
}

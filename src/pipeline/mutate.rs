//! Mailbox mutations: idempotent mark-as-read and batched trash.

use futures_util::future::try_join_all;
use thiserror::Error;

use crate::google::gmail::{self, GmailError, UNREAD_LABEL};

/// A trash batch failed partway through. `deleted` counts the ids in
/// batches that fully committed before the failure so the caller can
/// reconcile its local view.
#[derive(Debug, Error)]
#[error("Trash failed after {deleted} deletions: {source}")]
pub struct TrashError {
    pub deleted: usize,
    #[source]
    pub source: GmailError,
}

/// Remove the UNREAD label from a message if present. A second call
/// sees no UNREAD label and performs no mutation.
pub async fn mark_read(
    api_hostname: &str,
    access_token: &str,
    id: &str,
) -> Result<(), GmailError> {
    let message = gmail::get_message(api_hostname, access_token, id, "minimal").await?;
    if message.is_read() {
        return Ok(());
    }
    gmail::modify_message(api_hostname, access_token, id, &[UNREAD_LABEL]).await
}

/// Move the given messages to the trash in fixed-size batches. Calls
/// within a batch run concurrently; batches run sequentially. Unlike
/// detail fetches, a single failure here is surfaced: the caller must
/// know the accurate set of survivors.
pub async fn trash_all(
    api_hostname: &str,
    access_token: &str,
    ids: &[String],
    batch_size: usize,
) -> Result<usize, TrashError> {
    let batch_size = batch_size.max(1);
    let mut deleted = 0;

    for batch in ids.chunks(batch_size) {
        try_join_all(
            batch
                .iter()
                .map(|id| gmail::trash_message(api_hostname, access_token, id)),
        )
        .await
        .map_err(|source| TrashError { deleted, source })?;
        deleted += batch.len();
    }

    Ok(deleted)
}

use crate::error::Result;
use crate::models::{Poll, PollId, PollSummary};

/// Client side of the poll REST contract.
///
/// Implementations map connection failures and unreadable bodies to
/// `SyncError::Transient` and non-success statuses to
/// `SyncError::ServerRejection`.
#[allow(async_fn_in_trait)]
pub trait PollApi {
    async fn list_polls(&self) -> Result<Vec<PollSummary>>;
    async fn get_poll(&self, id: PollId) -> Result<Poll>;
    async fn cast_vote(&self, id: PollId, option: usize) -> Result<Poll>;
}

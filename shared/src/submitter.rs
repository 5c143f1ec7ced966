use tracing::{info, warn};
use crate::api::PollApi;
use crate::error::Result;
use crate::models::{Poll, PollId};
use crate::validation::validate_poll;

/// Sends one vote and returns the server's post-vote tally.
///
/// Callers check the local preconditions first (see
/// `SyncController::begin_vote`); this performs exactly one write.
pub async fn submit<A: PollApi>(api: &A, poll_id: PollId, option: usize) -> Result<Poll> {
    match api.cast_vote(poll_id, option).await {
        Ok(poll) => {
            validate_poll(&poll, poll_id)?;
            info!(poll_id, option, total = poll.total_votes(), "vote accepted");
            Ok(poll)
        }
        Err(e) => {
            warn!(poll_id, option, error = %e, "vote submission failed");
            Err(e)
        }
    }
}

use std::collections::HashMap;
use tracing::{debug, info, warn};
use crate::error::{Result, SyncError};
use crate::models::{Poll, PollId, PollSummary};
use crate::poller::{Completion, PollerSlot, Ticket};
use crate::validation::{validate_option_index, validate_poll};
use crate::vote_guard::{KeyValueStore, VoteGuard};

pub type DirectoryTicket = Ticket<()>;
pub type DetailTicket = Ticket<PollId>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTicket {
    pub poll_id: PollId,
    pub option: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Listing,
    Viewing(PollId),
    Voting(PollId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Unchanged,
    Selected(PollId),
    Cleared,
}

/// Everything the renderer needs. Owned by the controller, never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncState {
    pub directory: Vec<PollSummary>,
    pub selected_poll_id: Option<PollId>,
    pub selected_poll: Option<Poll>,
    pub own_vote: Option<usize>,
    pub directory_stale: bool,
    pub detail_stale: bool,
    pub last_error: Option<String>,
}

impl SyncState {
    pub fn can_vote(&self) -> bool {
        self.selected_poll.is_some() && self.own_vote.is_none()
    }
}

/// Tuning for the poll loops. Intervals are used by the session driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    pub directory_interval: std::time::Duration,
    pub detail_interval: std::time::Duration,
    pub stale_after_failures: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            directory_interval: std::time::Duration::from_secs(3),
            detail_interval: std::time::Duration::from_secs(3),
            stale_after_failures: 3,
        }
    }
}

/// Sans-IO state machine reconciling directory snapshots, detail snapshots
/// and vote results for one selected poll at a time.
pub struct SyncController<S> {
    config: SyncConfig,
    state: SyncState,
    directory_loaded: bool,
    directory: PollerSlot<()>,
    detail: PollerSlot<PollId>,
    pending_votes: HashMap<PollId, usize>,
    guard: VoteGuard<S>,
    closed: bool,
}

impl<S: KeyValueStore> SyncController<S> {
    pub fn new(store: S, config: SyncConfig) -> Self {
        let mut directory = PollerSlot::new();
        directory.start_for(());
        Self {
            config,
            state: SyncState::default(),
            directory_loaded: false,
            directory,
            detail: PollerSlot::new(),
            pending_votes: HashMap::new(),
            guard: VoteGuard::new(store),
            closed: false,
        }
    }

    pub fn state(&self) -> &SyncState {
        &self.state
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    #[cfg(test)]
    pub fn guard(&self) -> &VoteGuard<S> {
        &self.guard
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn phase(&self) -> Phase {
        match self.state.selected_poll_id {
            Some(id) if self.pending_votes.contains_key(&id) => Phase::Voting(id),
            Some(id) => Phase::Viewing(id),
            None if self.directory_loaded => Phase::Listing,
            None => Phase::Idle,
        }
    }

    pub fn begin_directory_fetch(&mut self) -> Option<DirectoryTicket> {
        if self.closed {
            return None;
        }
        self.directory.begin()
    }

    pub fn apply_directory(
        &mut self,
        ticket: DirectoryTicket,
        result: Result<Vec<PollSummary>>,
    ) -> SelectionChange {
        if self.directory.finish(&ticket) == Completion::Stale {
            return SelectionChange::Unchanged;
        }

        let polls = match result {
            Ok(polls) => polls,
            Err(e) => {
                let failures = self.directory.record_failure();
                warn!(failures, error = %e, "directory refresh failed, keeping last snapshot");
                self.state.directory_stale = failures >= self.config.stale_after_failures;
                return SelectionChange::Unchanged;
            }
        };

        self.directory.record_success();
        self.directory_loaded = true;
        self.state.directory_stale = false;
        self.state.directory = polls;

        let current = self.state.selected_poll_id;
        let listed = current.map_or(false, |id| self.state.directory.iter().any(|p| p.id == id));
        if listed {
            return SelectionChange::Unchanged;
        }
        match self.state.directory.first().map(|p| p.id) {
            Some(first) => {
                if let Some(gone) = current {
                    info!(poll_id = gone, "selected poll left the directory");
                }
                self.select(first);
                SelectionChange::Selected(first)
            }
            None if current.is_some() => {
                self.clear_selection();
                SelectionChange::Cleared
            }
            None => SelectionChange::Unchanged,
        }
    }

    /// Returns `false` when `poll_id` is already selected.
    pub fn select(&mut self, poll_id: PollId) -> bool {
        if self.closed || self.state.selected_poll_id == Some(poll_id) {
            return false;
        }
        debug!(poll_id, "selecting poll");
        self.state.selected_poll_id = Some(poll_id);
        self.state.selected_poll = None;
        self.state.detail_stale = false;
        self.state.last_error = None;
        self.state.own_vote = self.guard.has_voted(poll_id);
        self.detail.start_for(poll_id);
        true
    }

    fn clear_selection(&mut self) {
        self.state.selected_poll_id = None;
        self.state.selected_poll = None;
        self.state.own_vote = None;
        self.state.detail_stale = false;
        self.state.last_error = None;
        self.detail.stop();
    }

    pub fn begin_detail_fetch(&mut self) -> Option<DetailTicket> {
        if self.closed {
            return None;
        }
        self.detail.begin()
    }

    /// Returns `true` when the displayed tally changed.
    pub fn apply_detail(&mut self, ticket: DetailTicket, result: Result<Poll>) -> bool {
        if self.detail.finish(&ticket) == Completion::Stale {
            return false;
        }
        let poll_id = ticket.target;

        match result.and_then(|poll| validate_poll(&poll, poll_id).map(|_| poll)) {
            Ok(poll) => {
                self.detail.record_success();
                self.state.detail_stale = false;
                self.state.own_vote = self.guard.has_voted(poll_id);
                let changed = self.state.selected_poll.as_ref() != Some(&poll);
                self.state.selected_poll = Some(poll);
                changed
            }
            Err(e) => {
                let failures = self.detail.record_failure();
                warn!(poll_id, failures, error = %e, "poll refresh failed, keeping last tally");
                let stale = failures >= self.config.stale_after_failures;
                let flipped = stale != self.state.detail_stale;
                self.state.detail_stale = stale;
                flipped
            }
        }
    }

    /// Checks every local precondition for a vote on the selected poll.
    /// Nothing is sent when this fails.
    pub fn begin_vote(&mut self, option: usize) -> Result<VoteTicket> {
        if self.closed {
            return Err(SyncError::Closed);
        }
        let poll_id = self.state.selected_poll_id.ok_or(SyncError::NoSelection)?;
        if let Some(previous) = self.guard.has_voted(poll_id) {
            self.state.own_vote = Some(previous);
            return Err(SyncError::AlreadyVoted { poll_id, option: previous });
        }
        if self.pending_votes.contains_key(&poll_id) {
            return Err(SyncError::VoteInFlight(poll_id));
        }
        let poll = self.state.selected_poll.as_ref().ok_or(SyncError::NotLoaded)?;
        validate_option_index(poll, option)?;

        self.pending_votes.insert(poll_id, option);
        self.state.last_error = None;
        Ok(VoteTicket { poll_id, option })
    }

    pub fn apply_vote(&mut self, ticket: VoteTicket, result: Result<Poll>) -> Result<()> {
        self.pending_votes.remove(&ticket.poll_id);
        let selected = !self.closed && self.state.selected_poll_id == Some(ticket.poll_id);

        let poll = match result {
            Ok(poll) => Some(poll),
            // The write went through even though the body is unusable.
            Err(SyncError::MalformedPoll { reason, .. }) => {
                warn!(poll_id = ticket.poll_id, %reason, "vote accepted with unusable tally");
                None
            }
            Err(e) => {
                if selected {
                    self.state.last_error = Some(e.user_message());
                }
                return Err(e);
            }
        };

        // Recorded even after teardown: the server has counted this vote.
        let persisted = self.guard.record_vote(ticket.poll_id, ticket.option)
            .map_err(|e| SyncError::StorageUnavailable(e.0));
        if let Err(e) = &persisted {
            warn!(poll_id = ticket.poll_id, error = %e, "vote guard not persisted");
        }

        if self.closed {
            debug!(poll_id = ticket.poll_id, "session closed, vote recorded without merging");
            return Ok(());
        }

        if selected {
            self.state.own_vote = self.guard.has_voted(ticket.poll_id);
            self.state.last_error = persisted.err().map(|e| e.user_message());
            // The write causally follows whatever read is still on the wire.
            self.detail.invalidate();
            if let Some(poll) = poll {
                self.detail.record_success();
                self.state.detail_stale = false;
                self.state.selected_poll = Some(poll);
            }
        }
        Ok(())
    }

    pub fn teardown(&mut self) {
        self.closed = true;
        self.directory.stop();
        self.detail.stop();
        self.pending_votes.clear();
    }
}

use std::collections::{BTreeMap, HashSet};
use std::io::ErrorKind;
use std::path::Path;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use shared::{CreatePollRequest, Poll, PollId, PollSummary};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Poll not found")]
    NotFound,
    #[error("Invalid option index")]
    InvalidOption,
    #[error("Already voted")]
    AlreadyVoted,
    #[error("Data file unavailable: {0}")]
    Io(String),
    #[error("Data file is corrupt: {0}")]
    Corrupt(String),
}

/// A poll as kept on disk, with the fingerprints that already voted on it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredPoll {
    #[serde(flatten)]
    pub poll: Poll,
    #[serde(default)]
    pub voters: HashSet<String>,
}

#[derive(Debug)]
pub struct PollStore {
    polls: BTreeMap<PollId, StoredPoll>,
    next_id: PollId,
    dirty: bool,
}

impl Default for PollStore {
    fn default() -> Self {
        Self { polls: BTreeMap::new(), next_id: 1, dirty: false }
    }
}

impl PollStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_polls(polls: Vec<StoredPoll>) -> Self {
        let next_id = polls.iter().map(|stored| stored.poll.id).max().map_or(1, |max| max + 1);
        let polls = polls.into_iter().map(|stored| (stored.poll.id, stored)).collect();
        Self { polls, next_id, dirty: false }
    }

    /// A missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No data file at {}, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };
        let raw = raw.trim_start_matches('\u{feff}');
        if raw.trim().is_empty() {
            return Ok(Self::new());
        }
        let polls: Vec<StoredPoll> =
            serde_json::from_str(raw).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        if let Some(bad) = polls.iter().find(|stored| !stored.poll.is_consistent()) {
            return Err(StoreError::Corrupt(format!("poll {} has mismatched votes", bad.poll.id)));
        }
        let store = Self::from_polls(polls);
        info!("Loaded {} polls from {}, next id {}", store.polls.len(), path.display(), store.next_id);
        Ok(store)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        let polls: Vec<&StoredPoll> = self.polls.values().collect();
        serde_json::to_string_pretty(&polls).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    /// Serializes the store and clears the dirty flag, or returns `None` when
    /// nothing changed since the last call.
    pub fn take_snapshot(&mut self) -> Result<Option<String>, StoreError> {
        if !self.dirty {
            return Ok(None);
        }
        let json = self.to_json()?;
        self.dirty = false;
        Ok(Some(json))
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn next_id(&self) -> PollId {
        self.next_id
    }

    pub fn list(&self) -> Vec<PollSummary> {
        self.polls.values().map(|stored| stored.poll.summary()).collect()
    }

    pub fn get(&self, id: PollId) -> Result<Poll, StoreError> {
        self.polls.get(&id).map(|stored| stored.poll.clone()).ok_or(StoreError::NotFound)
    }

    /// Expects a request that already passed validation.
    pub fn create(&mut self, request: CreatePollRequest) -> Poll {
        let id = self.next_id;
        self.next_id += 1;
        let poll = Poll::new(id, request.question, request.options);
        self.polls.insert(id, StoredPoll { poll: poll.clone(), voters: HashSet::new() });
        self.dirty = true;
        debug!(poll_id = id, "poll created");
        poll
    }

    pub fn vote(&mut self, id: PollId, option: usize, fingerprint: &str) -> Result<Poll, StoreError> {
        let stored = self.polls.get_mut(&id).ok_or(StoreError::NotFound)?;
        if option >= stored.poll.votes.len() {
            return Err(StoreError::InvalidOption);
        }
        if !stored.voters.insert(fingerprint.to_string()) {
            return Err(StoreError::AlreadyVoted);
        }
        stored.poll.votes[option] += 1;
        self.dirty = true;
        Ok(stored.poll.clone())
    }
}

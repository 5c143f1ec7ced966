use std::cell::RefCell;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};
use crate::models::PollId;

const KEY_PREFIX: &str = "poll_voted_";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("storage unavailable: {0}")]
pub struct StorageError(pub String);

/// Device-scoped string storage keyed by poll.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every read and write fails.
    pub fn unavailable() -> Self {
        Self { entries: RefCell::default(), unavailable: true }
    }

    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.borrow_mut().insert(key.into(), value.into());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.unavailable {
            return Err(StorageError("memory store disabled".into()));
        }
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError("memory store disabled".into()));
        }
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::rc::Rc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

pub fn guard_key(poll_id: PollId) -> String {
    format!("{KEY_PREFIX}{poll_id}")
}

/// Write-once record of the option this device chose per poll.
///
/// Entries recorded during this session are also kept in memory, so a store
/// that refuses writes only costs durability across restarts.
pub struct VoteGuard<S> {
    store: S,
    session: RefCell<HashMap<PollId, usize>>,
}

impl<S: KeyValueStore> VoteGuard<S> {
    pub fn new(store: S) -> Self {
        Self { store, session: RefCell::default() }
    }

    pub fn has_voted(&self, poll_id: PollId) -> Option<usize> {
        if let Some(&option) = self.session.borrow().get(&poll_id) {
            return Some(option);
        }
        match self.store.get(&guard_key(poll_id)) {
            Ok(Some(raw)) => match raw.trim().parse::<usize>() {
                Ok(option) => Some(option),
                Err(_) => {
                    warn!(poll_id, value = %raw, "ignoring unreadable vote guard entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(poll_id, error = %e, "vote guard read failed, treating poll as unvoted");
                None
            }
        }
    }

    /// Returns `Ok(false)` without touching storage when an entry already exists.
    pub fn record_vote(&self, poll_id: PollId, option: usize) -> Result<bool, StorageError> {
        if self.has_voted(poll_id).is_some() {
            debug!(poll_id, option, "vote guard already set, keeping existing entry");
            return Ok(false);
        }
        self.session.borrow_mut().insert(poll_id, option);
        self.store.set(&guard_key(poll_id), &option.to_string())?;
        Ok(true)
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_voted_is_idempotent() {
        let guard = VoteGuard::new(MemoryStore::new().with_entry("poll_voted_3", "1"));
        assert_eq!(guard.has_voted(3), Some(1));
        assert_eq!(guard.has_voted(3), Some(1));
        assert_eq!(guard.has_voted(4), None);
        assert_eq!(guard.has_voted(4), None);
    }

    #[test]
    fn record_is_write_once() {
        let guard = VoteGuard::new(MemoryStore::new());
        assert_eq!(guard.record_vote(7, 2), Ok(true));
        assert_eq!(guard.record_vote(7, 0), Ok(false));
        assert_eq!(guard.has_voted(7), Some(2));
        assert_eq!(guard.store().get("poll_voted_7"), Ok(Some("2".into())));
    }

    #[test]
    fn polls_are_independent() {
        let guard = VoteGuard::new(MemoryStore::new());
        guard.record_vote(1, 0).unwrap();
        assert_eq!(guard.has_voted(2), None);
        guard.record_vote(2, 1).unwrap();
        assert_eq!(guard.has_voted(1), Some(0));
        assert_eq!(guard.has_voted(2), Some(1));
    }

    #[test]
    fn unavailable_storage_fails_open() {
        let guard = VoteGuard::new(MemoryStore::unavailable());
        assert_eq!(guard.has_voted(1), None);
        assert!(guard.record_vote(1, 1).is_err());
        // still remembered for the rest of the session
        assert_eq!(guard.has_voted(1), Some(1));
    }

    #[test]
    fn garbage_entry_reads_as_unvoted() {
        let guard = VoteGuard::new(MemoryStore::new().with_entry("poll_voted_9", "yes"));
        assert_eq!(guard.has_voted(9), None);
    }
}

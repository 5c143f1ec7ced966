use serde::{Serialize, Deserialize};
use thiserror::Error;
use crate::models::PollId;

#[derive(Debug, Clone, Copy, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    #[error("Invalid input provided")]
    InvalidInput,
    #[error("Resource not found")]
    NotFound,
    #[error("Resource conflict")]
    Conflict,
    #[error("Rate limit exceeded")]
    RateLimited,
    #[error("Internal system error")]
    SystemError,
}

impl ErrorCode {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 422 => ErrorCode::InvalidInput,
            404 => ErrorCode::NotFound,
            403 | 409 => ErrorCode::Conflict,
            429 => ErrorCode::RateLimited,
            _ => ErrorCode::SystemError,
        }
    }
}

/// JSON error body returned by the poll server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("Network error: {0}")]
    Transient(String),
    #[error("{code}: {message}")]
    ServerRejection { code: ErrorCode, message: String },
    #[error("Local storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("Malformed poll {expected}: {reason}")]
    MalformedPoll { expected: PollId, reason: String },
    #[error("No poll selected")]
    NoSelection,
    #[error("Poll not loaded yet")]
    NotLoaded,
    #[error("Already voted for option {option} on poll {poll_id}")]
    AlreadyVoted { poll_id: PollId, option: usize },
    #[error("Vote already in flight for poll {0}")]
    VoteInFlight(PollId),
    #[error("Invalid option {index} (poll has {count} options)")]
    InvalidOption { index: usize, count: usize },
    #[error("Sync session closed")]
    Closed,
}

impl SyncError {
    pub fn rejection(status: u16, message: impl Into<String>) -> Self {
        SyncError::ServerRejection { code: ErrorCode::from_status(status), message: message.into() }
    }

    pub fn user_message(&self) -> String {
        match self {
            SyncError::Transient(_) => "Connection problem. Please try again.".into(),
            SyncError::ServerRejection { code: ErrorCode::Conflict, .. } =>
                "You have already voted in this poll.".into(),
            SyncError::ServerRejection { code: ErrorCode::NotFound, .. } =>
                "This poll is no longer available.".into(),
            SyncError::ServerRejection { code: ErrorCode::RateLimited, .. } =>
                "You're voting too quickly. Please try again.".into(),
            SyncError::ServerRejection { message, .. } => message.clone(),
            SyncError::AlreadyVoted { .. } => "You have already voted in this poll.".into(),
            SyncError::VoteInFlight(_) => "Your vote is being submitted.".into(),
            SyncError::StorageUnavailable(_) =>
                "Your vote was counted, but this browser could not remember it.".into(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

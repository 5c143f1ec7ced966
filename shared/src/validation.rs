use std::collections::HashSet;
use crate::models::{CreatePollRequest, Poll, PollId};
use crate::error::SyncError;

pub const MAX_QUESTION_LENGTH: usize = 200;
pub const MAX_OPTION_LENGTH: usize = 100;
pub const MAX_OPTIONS: usize = 20;
pub const MIN_OPTIONS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Question is required")]
    EmptyQuestion,
    #[error("Question exceeds maximum length of {MAX_QUESTION_LENGTH}")]
    QuestionTooLong,
    #[error("Option text exceeds maximum length of {MAX_OPTION_LENGTH}")]
    OptionTooLong,
    #[error("Too many options (maximum {MAX_OPTIONS})")]
    TooManyOptions,
    #[error("Too few options (minimum {MIN_OPTIONS})")]
    TooFewOptions,
    #[error("Duplicate option: {0}")]
    DuplicateOption(String),
    #[error("Empty option text")]
    EmptyOption,
}

pub fn validate_create_request(request: &CreatePollRequest) -> Result<(), ValidationError> {
    let question = request.question.trim();
    if question.is_empty() { return Err(ValidationError::EmptyQuestion); }
    if question.chars().count() > MAX_QUESTION_LENGTH { return Err(ValidationError::QuestionTooLong); }
    if request.options.len() > MAX_OPTIONS { return Err(ValidationError::TooManyOptions); }
    if request.options.len() < MIN_OPTIONS { return Err(ValidationError::TooFewOptions); }

    if request.options.iter().any(|opt| opt.trim().is_empty()) { return Err(ValidationError::EmptyOption); }
    if request.options.iter().any(|opt| opt.trim().chars().count() > MAX_OPTION_LENGTH) {
        return Err(ValidationError::OptionTooLong);
    }

    let mut seen = HashSet::new();
    for opt in &request.options {
        if !seen.insert(opt.trim().to_lowercase()) {
            return Err(ValidationError::DuplicateOption(opt.trim().to_string()));
        }
    }

    Ok(())
}

/// Rejects a server snapshot whose shape cannot be rendered for `expected`.
pub fn validate_poll(poll: &Poll, expected: PollId) -> Result<(), SyncError> {
    if poll.id != expected {
        return Err(SyncError::MalformedPoll {
            expected,
            reason: format!("response carried poll {}", poll.id),
        });
    }
    if !poll.is_consistent() {
        return Err(SyncError::MalformedPoll {
            expected,
            reason: format!("{} options but {} vote counts", poll.options.len(), poll.votes.len()),
        });
    }
    Ok(())
}

pub fn validate_option_index(poll: &Poll, index: usize) -> Result<(), SyncError> {
    if index >= poll.option_count() {
        return Err(SyncError::InvalidOption { index, count: poll.option_count() });
    }
    Ok(())
}

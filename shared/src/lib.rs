pub mod error;
pub mod models;
pub mod validation;
pub mod user_info;
pub mod tally;
pub mod vote_guard;
pub mod poller;
pub mod scheduler;
pub mod api;
pub mod submitter;
pub mod controller;
pub mod session;

pub use error::{ErrorCode, ErrorResponse, Result, SyncError};
pub use models::*;
pub use validation::*;
pub use user_info::*;
pub use tally::{share, shares, tally_rows, TallyRow};
pub use vote_guard::{KeyValueStore, MemoryStore, StorageError, VoteGuard};
pub use controller::{Phase, SelectionChange, SyncConfig, SyncController, SyncState, VoteTicket};
pub use session::SyncSession;
pub use scheduler::Scheduler;
pub use api::PollApi;

#[cfg(test)]
mod tests;

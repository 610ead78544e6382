//! Typed errors returned by the scheduling and rollup engine.
//!
//! Callers match on the variant to decide how to respond: validation and
//! state-transition errors carry user-facing text, `NotFound` is identical
//! whether the entity is missing or owned by someone else, and persistence
//! failures render generically while keeping the underlying `rusqlite`
//! error as the source.

use super::messages::Message;
use super::task::TaskStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("{0}")]
    Validation(String),

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("{}", Message::CannotTransition(.from.to_string(), .to.to_string()))]
    InvalidStateTransition { from: TaskStatus, to: TaskStatus },

    #[error("{}", Message::StorageFailure)]
    Persistence(#[from] rusqlite::Error),
}

impl TrackerError {
    pub fn validation(msg: Message) -> Self {
        TrackerError::Validation(msg.to_string())
    }

    pub fn task_not_found() -> Self {
        TrackerError::NotFound { entity: "Task" }
    }
}

pub type TrackerResult<T> = std::result::Result<T, TrackerError>;

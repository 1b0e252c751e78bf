use thiserror::Error;

use huddle_shared::types::ChatId;
use huddle_shared::ValidationError;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A precondition of a mutating operation did not hold.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No roster entry carries this id.
    #[error("Chat not found: {0}")]
    ChatNotFound(ChatId),

    /// A seed tried to insert an id that is already in the roster.
    #[error("Duplicate chat id: {0}")]
    DuplicateChatId(ChatId),

    /// Reading a seed file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A seed file is not valid JSON of the expected shape.
    #[error("Seed format error: {0}")]
    SeedFormat(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

use thiserror::Error;

/// A required field was missing or an input was rejected before an action
/// ran. The action is aborted and no state changes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a group name")]
    EmptyGroupName,

    #[error("Please select at least one member")]
    NoMembers,

    #[error("Message is empty")]
    EmptyMessage,

    #[error("File format not allowed: {file}")]
    DisallowedFormat { file: String },

    #[error("File size exceeds limit ({limit}): {file}")]
    FileTooLarge { file: String, limit: String },

    #[error("Unknown chat kind: {kind} (expected group or individual)")]
    UnknownChatKind { kind: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Malformed frame: {0}")]
    Malformed(String),

    #[error("Failed to encode event: {0}")]
    Encode(String),

    #[error("Unexpected binary frame ({0} bytes)")]
    BinaryFrame(usize),
}

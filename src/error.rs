//! Error types for the card engine.
//!
//! Nothing here ever escapes `Engine::execute`: a `CommandError` is turned
//! into response text (and the `result` variable), a `StoreError` is logged
//! and dropped. Only `DefinitionError` reaches the user directly, when the
//! CLI is pointed at a broken stack file.

use thiserror::Error;

/// A recognized command that could not be carried out.
///
/// `Display` is the exact text returned from `execute`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Can't go to card {0}")]
    CardOutOfRange(u64),

    #[error("Can't find card \"{0}\"")]
    NoSuchCard(String),

    /// `go recent` with nothing to pop, or with a popped id whose card is gone.
    #[error("No recent card")]
    NoRecentCard,

    #[error("Can't find field \"{0}\"")]
    NoSuchField(String),

    #[error("Can't modify this stack")]
    StackLocked,

    #[error("Couldn't find \"{0}\"")]
    SearchFailed(String),
}

impl CommandError {
    /// The value stored into `result` when this error is reported.
    pub fn result_text(&self) -> String {
        match self {
            Self::SearchFailed(_) => "not found".to_string(),
            other => other.to_string(),
        }
    }
}

/// Failure inside a key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error on '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid store key '{0}'")]
    InvalidKey(String),

    #[error("snapshot encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A stack definition that violates the model invariants.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("invalid stack definition: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stack has no cards")]
    NoCards,

    #[error("duplicate card id {0}")]
    DuplicateCardId(u32),

    #[error("duplicate field id {0}")]
    DuplicateFieldId(u32),

    #[error("card {card} refers to missing background {background}")]
    MissingBackground { card: u32, background: u32 },
}

/// Convenience alias.
pub type CommandResult<T> = Result<T, CommandError>;

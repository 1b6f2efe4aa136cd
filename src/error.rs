use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    /// The spawn table has nothing eligible at this depth; generation cannot
    /// proceed.
    #[error("spawn table has no candidates at depth {depth}")]
    EmptyCandidateSet { depth: i32 },

    /// Recoverable: the menu falls back to "no saved game".
    #[error("no saved game")]
    SaveMissing,

    /// Recoverable: the slot exists but does not parse as a world.
    #[error("save slot is unreadable: {0}")]
    SaveCorrupt(#[from] serde_json::Error),

    /// Recoverable: the slot parsed but its contents are inconsistent.
    #[error("save slot is inconsistent: {reason}")]
    SaveInvalid { reason: &'static str },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

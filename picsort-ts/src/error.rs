//! Error types for picsort-ts
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation. Variants fall into three families: arbitration errors
//! (recoverable by re-acquiring a session), validation errors (caller
//! mistakes or stale client state, surfaced verbatim), and internal
//! errors (database, I/O, training).

use thiserror::Error;

/// Main error type for picsort-ts
#[derive(Error, Debug)]
pub enum Error {
    // --- Arbitration ---
    /// Another session currently holds the working token
    #[error("Session busy: another editing session is active")]
    SessionBusy,

    /// Presented token does not match the active session
    #[error("Session expired: token no longer valid")]
    SessionExpired,

    /// Operation attempted without a valid, current session token
    #[error("Unauthorized: a valid session token is required")]
    Unauthorized,

    // --- Validation ---
    /// Folder already exists
    #[error("Folder already exists: {0}")]
    FolderExists(String),

    /// Folder name collides with the reserved input folder
    #[error("Reserved folder name: {0}")]
    ReservedName(String),

    /// Folder name is empty or whitespace
    #[error("Invalid folder name")]
    InvalidName,

    /// Folder does not exist
    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    /// Folder is non-empty or referenced by a pending action
    #[error("Folder not deletable: {0}")]
    FolderNotDeletable(String),

    /// Image already has a pending action
    #[error("Image already pending: {0}")]
    AlreadyPending(String),

    /// Image is not currently present in the input folder
    #[error("Image not found: {0}")]
    ImageNotFound(String),

    /// The input folder cannot be an action target
    #[error("Cannot target the input folder")]
    ReservedTarget,

    /// Undo requested with no pending actions
    #[error("No pending actions to undo")]
    EmptyStack,

    /// Commit requested with no pending actions
    #[error("Nothing to commit")]
    NothingToCommit,

    /// Input folder has no unqueued images left
    #[error("No image available in input folder")]
    NoImageAvailable,

    // --- Internal ---
    /// Classifier training failure
    #[error("Training failed: {0}")]
    Training(String),

    /// Classifier prediction failure
    #[error("Prediction failed: {0}")]
    Prediction(String),

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for errors detected before any mutation, which a client can
    /// fix by correcting its request or refreshing its view
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::FolderExists(_)
                | Error::ReservedName(_)
                | Error::InvalidName
                | Error::FolderNotFound(_)
                | Error::FolderNotDeletable(_)
                | Error::AlreadyPending(_)
                | Error::ImageNotFound(_)
                | Error::ReservedTarget
                | Error::EmptyStack
                | Error::NothingToCommit
                | Error::NoImageAvailable
        )
    }
}

/// Convenience Result type using picsort-ts Error
pub type Result<T> = std::result::Result<T, Error>;

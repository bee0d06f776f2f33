//! Error types for the list synchronization engine.

use thiserror::Error;

use horizon_listsync_core::WrongThread;

use crate::model::ItemId;
use crate::view::IndexPath;

/// Errors raised while translating or applying list changes.
///
/// These are collaborator contract violations. Conditions that are part of
/// normal operation (an unknown index, a drop outside the list, an event that
/// reaches a surface before its first layout) are not errors.
#[derive(Error, Debug)]
pub enum SyncError {
    /// A mutation event that no well-behaved producer would emit.
    #[error("malformed mutation event: {reason}")]
    InvalidEvent { reason: String },

    /// A section index that does not exist in the model.
    #[error("section {index} out of range (model has {len} sections)")]
    SectionOutOfRange { index: usize, len: usize },

    /// A transaction was opened while another one is still open.
    #[error("a view transaction is already in progress")]
    TransactionInProgress,

    /// The list was driven from a thread other than the one that owns it.
    #[error("thread affinity violation: {0}")]
    WrongThread(#[from] WrongThread),

    /// The configuration could not be decoded.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// The configuration could not be encoded.
    #[error("could not serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// A drop took an item out of its section and could put it back neither
    /// at the destination nor at its origin. The model no longer holds the
    /// item.
    #[error("item {item} dragged from {origin} was lost")]
    ItemLost { item: ItemId, origin: IndexPath },

    /// The decoration worker is no longer accepting jobs.
    #[error("decoration loader is shut down")]
    LoaderUnavailable,
}

impl SyncError {
    /// Create an invalid-event error.
    pub fn invalid_event(reason: impl Into<String>) -> Self {
        Self::InvalidEvent {
            reason: reason.into(),
        }
    }
}

/// Result type for synchronization operations.
pub type SyncResult<T> = Result<T, SyncError>;

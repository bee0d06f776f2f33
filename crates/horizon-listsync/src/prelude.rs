//! Prelude module for Horizon ListSync.
//!
//! ```
//! use horizon_listsync::prelude::*;
//! ```

// ============================================================================
// Model
// ============================================================================

pub use crate::model::{
    EventIndex, EventScope, Item, ItemId, MutationEvent, MutationKind, ObservableCollection,
    ObservableVec, Section, SectionId, SectionProperty, SectionedModel,
};

// ============================================================================
// View
// ============================================================================

pub use crate::view::{IndexPath, RecordingSurface, RenderingSurface, RowAnimation, ViewOperation};

// ============================================================================
// Synchronization
// ============================================================================

pub use crate::{
    DragHandle, DropProposal, ListSynchronizer, SyncConfig, SyncError, SyncResult,
};

// ============================================================================
// Signal/Slot System
// ============================================================================

pub use horizon_listsync_core::{ConnectionGuard, ConnectionId, Signal};

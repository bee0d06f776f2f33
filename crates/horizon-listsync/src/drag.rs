//! Interactive drag-to-reorder across sections.
//!
//! A drop mutates the model *silently* and tells the surface itself, as two
//! transactions: a DeleteRows at the origin, then an InsertRows at the
//! destination. A plain MoveRow is never used, even within one section, so
//! that same-section and cross-section drops behave identically.
//!
//! Only the destination section's drag-sortable flag decides whether a drop
//! is accepted. A non-sortable section can still be dragged out of, unless
//! [`DragConfig::require_sortable_origin`] is set.

use std::fmt;

use horizon_listsync_core::logging::targets;

use crate::batch::BatchExecutor;
use crate::config::DragConfig;
use crate::error::{SyncError, SyncResult};
use crate::model::{ItemId, SectionedModel};
use crate::view::{IndexPath, RenderingSurface, ViewOperation};

/// A drag in progress: where it started and what is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DragHandle {
    source: IndexPath,
    item: ItemId,
}

impl DragHandle {
    /// Where the drag started.
    pub fn source(&self) -> IndexPath {
        self.source
    }

    /// The dragged item.
    pub fn item(&self) -> ItemId {
        self.item
    }

    /// The plain-text payload carried by the platform drag session.
    pub fn payload(&self) -> String {
        self.source.to_string()
    }
}

impl fmt::Display for DragHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {}", self.item, self.source)
    }
}

/// What the surface should show while a drag hovers over a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropProposal {
    /// Dropping here does nothing.
    Cancel,
    /// Dropping here moves the item.
    Move,
}

/// Validates and applies drag-and-drop reordering.
#[derive(Debug, Clone, Default)]
pub struct DragReorderCoordinator {
    config: DragConfig,
}

impl DragReorderCoordinator {
    /// Creates a coordinator.
    pub fn new(config: DragConfig) -> Self {
        Self { config }
    }

    /// Starts a drag at `source`.
    ///
    /// Returns `None` if no item is there, or if the origin section is not
    /// drag-sortable while sortable origins are required.
    pub fn begin_drag<T: Send + Sync + 'static>(
        &self,
        model: &SectionedModel<T>,
        source: IndexPath,
    ) -> Option<DragHandle> {
        let section = model.section(source.section)?;
        if self.config.require_sortable_origin && !section.is_drag_sortable() {
            tracing::debug!(target: targets::DRAG, %source, "origin section is not drag-sortable");
            return None;
        }
        self.resolve(model, source)
    }

    /// Builds a handle for whatever item is at `source` right now, without
    /// the origin check of [`begin_drag`](Self::begin_drag).
    pub fn resolve<T: Send + Sync + 'static>(
        &self,
        model: &SectionedModel<T>,
        source: IndexPath,
    ) -> Option<DragHandle> {
        let item = model.section(source.section)?.items().item_id(source.row)?;
        Some(DragHandle { source, item })
    }

    /// Returns `true` if the section at `dest` exists and accepts drops.
    pub fn can_drop<T: Send + Sync + 'static>(
        &self,
        model: &SectionedModel<T>,
        dest: IndexPath,
    ) -> bool {
        model
            .section(dest.section)
            .is_some_and(|section| section.is_drag_sortable())
    }

    /// The proposal for a drag of `item_count` items hovering over `dest`.
    ///
    /// Only single-item drags onto an accepting section are proposed as a
    /// move.
    pub fn drop_proposal<T: Send + Sync + 'static>(
        &self,
        model: &SectionedModel<T>,
        dest: Option<IndexPath>,
        item_count: usize,
    ) -> DropProposal {
        match dest {
            Some(dest) if item_count == 1 && self.can_drop(model, dest) => DropProposal::Move,
            _ => DropProposal::Cancel,
        }
    }

    /// Moves the dragged item to `dest`.
    ///
    /// Returns `Ok(false)` without touching the model or the surface when
    /// the drop cannot be applied: the destination does not exist or does
    /// not accept drops, the row is out of bounds, or the item at the
    /// handle's origin is no longer the one that was dragged.
    ///
    /// # Errors
    ///
    /// [`SyncError::TransactionInProgress`] if a transaction is open on
    /// `executor`. [`SyncError::ItemLost`] if the item was taken out of its
    /// section and neither the destination nor the origin would take it
    /// back; the surface is reloaded before returning.
    #[tracing::instrument(
        skip_all,
        target = "horizon_listsync::drag",
        level = "debug",
        fields(source = %handle.source, dest = %dest)
    )]
    pub fn perform_drop<T, S>(
        &self,
        model: &SectionedModel<T>,
        executor: &BatchExecutor,
        surface: &mut S,
        handle: &DragHandle,
        dest: IndexPath,
    ) -> SyncResult<bool>
    where
        T: Send + Sync + 'static,
        S: RenderingSurface + ?Sized,
    {
        if executor.is_in_transaction() {
            return Err(SyncError::TransactionInProgress);
        }

        let source = handle.source;
        let Some(origin) = model.section(source.section) else {
            tracing::warn!(target: targets::DRAG, %handle, "origin section no longer exists");
            return Ok(false);
        };
        if origin.items().item_id(source.row) != Some(handle.item) {
            tracing::warn!(target: targets::DRAG, %handle, "stale drag handle");
            return Ok(false);
        }
        let Some(target) = model.section(dest.section) else {
            tracing::warn!(target: targets::DRAG, %dest, "drop outside the list");
            return Ok(false);
        };
        if !target.is_drag_sortable() {
            tracing::warn!(target: targets::DRAG, %dest, "destination is not drag-sortable");
            return Ok(false);
        }
        let same_section = origin.id() == target.id();
        let capacity = target.row_count() - usize::from(same_section);
        if dest.row > capacity {
            tracing::warn!(target: targets::DRAG, %dest, capacity, "drop row out of bounds");
            return Ok(false);
        }

        let from = origin.mutate_silently();
        let Some(item) = from.remove(source.row) else {
            return Ok(false);
        };
        if let Err(err) = executor.execute(
            surface,
            vec![ViewOperation::DeleteRows {
                section: source.section,
                row: source.row,
                count: 1,
                animation: self.config.delete_animation,
            }],
        ) {
            // Nothing reached the surface; put the item back.
            if from.insert(source.row, item).is_err() {
                tracing::error!(target: targets::DRAG, %handle, %err, "item could not be restored");
                return Err(SyncError::ItemLost {
                    item: handle.item,
                    origin: source,
                });
            }
            return Err(err);
        }

        match target.mutate_silently().insert(dest.row, item) {
            Ok(()) => {
                executor.execute(
                    surface,
                    vec![ViewOperation::InsertRows {
                        section: dest.section,
                        row: dest.row,
                        count: 1,
                        animation: self.config.insert_animation,
                    }],
                )?;
                tracing::debug!(target: targets::DRAG, %handle, %dest, "drop applied");
                Ok(true)
            }
            Err(item) => {
                // The destination refused the item after the row was
                // already deleted; restore it where it came from.
                tracing::warn!(target: targets::DRAG, %handle, %dest, "destination rejected item, restoring");
                if from.insert(source.row, item).is_err() {
                    tracing::error!(target: targets::DRAG, %handle, "item could not be restored, reloading");
                    executor.execute(surface, vec![ViewOperation::FullReload])?;
                    return Err(SyncError::ItemLost {
                        item: handle.item,
                        origin: source,
                    });
                }
                executor.execute(
                    surface,
                    vec![ViewOperation::InsertRows {
                        section: source.section,
                        row: source.row,
                        count: 1,
                        animation: self.config.insert_animation,
                    }],
                )?;
                Ok(false)
            }
        }
    }
}

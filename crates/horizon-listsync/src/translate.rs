//! Mutation events to view operations.
//!
//! [`EventTranslator`] is a pure function of its configuration: it reads no
//! model state and touches no surface. The caller supplies the section the
//! event belongs to and whether the surface has realized any rows yet.
//!
//! # Mapping
//!
//! | Event                | Known indices                       | Unknown index |
//! |----------------------|-------------------------------------|---------------|
//! | Section Add          | `InsertSection(new)`                | `FullReload`  |
//! | Section Remove       | `DeleteSection(old)`                | `FullReload`  |
//! | Section Replace      | `ReloadSection(old)`, no animation  | `FullReload`  |
//! | Section Move / Reset | `FullReload`                        | `FullReload`  |
//! | Item Add             | `InsertRows(s, new, count)`         | `FullReload`  |
//! | Item Remove          | `DeleteRows(s, old, count)`         | `FullReload`  |
//! | Item Replace         | `ReloadRows(s, old, count)`         | `FullReload`  |
//! | Item Move            | `MoveRow(s, ..)` per unit           | `FullReload`  |
//! | Item Reset           | `FullReload`                        | `FullReload`  |
//!
//! Section Add and Remove with `count > 1` produce one section operation per
//! unit, at consecutive indices for Add and at the same index for Remove.
//!
//! # Cold surfaces
//!
//! A surface that has not realized any rows yet has nothing to animate, and
//! row indices sent to it would refer to rows it never laid out. By default
//! ([`ColdSurfacePolicy::ItemEvents`]) only item-scoped events are dropped
//! while the surface is cold; section-scoped events and section property
//! reloads still go through, and Reset is never dropped. With
//! [`ColdSurfacePolicy::AllEvents`] every non-Reset event and every property
//! reload is dropped until the surface realizes its rows.

use horizon_listsync_core::logging::targets;

use crate::config::{ColdSurfacePolicy, MultiRowMoves, SyncConfig};
use crate::error::{SyncError, SyncResult};
use crate::model::{EventScope, MutationEvent, MutationKind, SectionProperty};
use crate::view::{RowAnimation, ViewOperation};

/// Translates [`MutationEvent`]s into ordered [`ViewOperation`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventTranslator {
    multi_row_moves: MultiRowMoves,
    cold_surface: ColdSurfacePolicy,
    row_animation: RowAnimation,
}

impl Default for EventTranslator {
    fn default() -> Self {
        Self::new(&SyncConfig::default())
    }
}

impl EventTranslator {
    /// Creates a translator using the translation settings of `config`.
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            multi_row_moves: config.multi_row_moves,
            cold_surface: config.cold_surface,
            row_animation: config.row_animation,
        }
    }

    /// Translates one event.
    ///
    /// `section` is the view index of the section an item-scoped event
    /// belongs to; it is ignored for section-scoped events. `realized` is
    /// [`RenderingSurface::has_realized_rows`](crate::view::RenderingSurface::has_realized_rows).
    ///
    /// Returns an empty list when the event is suppressed by the cold-surface
    /// rule. Any unknown index yields exactly `[FullReload]`.
    ///
    /// # Errors
    ///
    /// [`SyncError::InvalidEvent`] for an item-scoped event with no section,
    /// or a non-Reset event with known indices and a zero count.
    #[tracing::instrument(skip(self), target = "horizon_listsync::translate", level = "trace")]
    pub fn translate(
        &self,
        event: &MutationEvent,
        section: Option<usize>,
        realized: bool,
    ) -> SyncResult<Vec<ViewOperation>> {
        if !realized && !event.is_reset() && self.is_cold_suppressed(event.scope) {
            tracing::trace!(target: targets::TRANSLATE, %event, "surface not realized, event suppressed");
            return Ok(Vec::new());
        }

        match event.scope {
            EventScope::Section => self.translate_section(event),
            EventScope::Item => {
                let section = section
                    .ok_or_else(|| SyncError::invalid_event("item event without a section"))?;
                self.translate_items(event, section)
            }
        }
    }

    /// Translates a change of a section presentation attribute.
    pub fn translate_property(
        &self,
        property: SectionProperty,
        section: usize,
        realized: bool,
    ) -> Vec<ViewOperation> {
        if !realized && self.cold_surface == ColdSurfacePolicy::AllEvents {
            tracing::trace!(target: targets::TRANSLATE, ?property, section, "surface not realized, property change suppressed");
            return Vec::new();
        }

        let animation = match property {
            SectionProperty::Visible => RowAnimation::Automatic,
            SectionProperty::Title | SectionProperty::FooterText | SectionProperty::HeaderHeight => {
                RowAnimation::None
            }
            SectionProperty::DragSortable => return Vec::new(),
        };
        vec![ViewOperation::ReloadSection { section, animation }]
    }

    fn is_cold_suppressed(&self, scope: EventScope) -> bool {
        match self.cold_surface {
            ColdSurfacePolicy::ItemEvents => scope == EventScope::Item,
            ColdSurfacePolicy::AllEvents => true,
        }
    }

    fn translate_section(&self, event: &MutationEvent) -> SyncResult<Vec<ViewOperation>> {
        let animation = self.row_animation;
        let ops = match event.kind {
            MutationKind::Add => match event.new_index.get() {
                None => full_reload(),
                Some(first) => (first..first + counted(event)?)
                    .map(|section| ViewOperation::InsertSection { section, animation })
                    .collect(),
            },
            MutationKind::Remove => match event.old_index.get() {
                None => full_reload(),
                Some(section) => (0..counted(event)?)
                    .map(|_| ViewOperation::DeleteSection { section, animation })
                    .collect(),
            },
            MutationKind::Replace => match event.old_index.get() {
                None => full_reload(),
                Some(first) => (first..first + counted(event)?)
                    .map(|section| ViewOperation::ReloadSection {
                        section,
                        animation: RowAnimation::None,
                    })
                    .collect(),
            },
            MutationKind::Move | MutationKind::Reset => full_reload(),
        };
        Ok(ops)
    }

    fn translate_items(&self, event: &MutationEvent, section: usize) -> SyncResult<Vec<ViewOperation>> {
        let animation = self.row_animation;
        let ops = match event.kind {
            MutationKind::Add => match event.new_index.get() {
                None => full_reload(),
                Some(row) => vec![ViewOperation::InsertRows {
                    section,
                    row,
                    count: counted(event)?,
                    animation,
                }],
            },
            MutationKind::Remove => match event.old_index.get() {
                None => full_reload(),
                Some(row) => vec![ViewOperation::DeleteRows {
                    section,
                    row,
                    count: counted(event)?,
                    animation,
                }],
            },
            MutationKind::Replace => match event.old_index.get() {
                None => full_reload(),
                Some(row) => vec![ViewOperation::ReloadRows {
                    section,
                    row,
                    count: counted(event)?,
                    animation,
                }],
            },
            MutationKind::Move => match (event.old_index.get(), event.new_index.get()) {
                (Some(old), Some(new)) => self.translate_move(section, old, new, counted(event)?),
                _ => full_reload(),
            },
            MutationKind::Reset => full_reload(),
        };
        Ok(ops)
    }

    /// One MoveRow per unit. Both indices advance per unit only when the
    /// block moves towards the front; moving it back repeats the same pair,
    /// since each move shifts the next unit into the vacated slot.
    fn translate_move(&self, section: usize, old: usize, new: usize, count: usize) -> Vec<ViewOperation> {
        if count > 1 && self.multi_row_moves == MultiRowMoves::FullReload {
            return full_reload();
        }
        let shift = new < old;
        (0..count)
            .map(|i| {
                let step = if shift { i } else { 0 };
                ViewOperation::MoveRow {
                    section,
                    from: old + step,
                    to: new + step,
                }
            })
            .collect()
    }
}

fn full_reload() -> Vec<ViewOperation> {
    vec![ViewOperation::FullReload]
}

fn counted(event: &MutationEvent) -> SyncResult<usize> {
    if event.count == 0 {
        return Err(SyncError::invalid_event(format!(
            "{:?} event with zero count",
            event.kind
        )));
    }
    Ok(event.count)
}

//! Keeps a rendering surface in step with a sectioned model.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use horizon_listsync_core::logging::targets;
use horizon_listsync_core::{ConnectionGuard, ThreadAffinity};

use crate::batch::BatchExecutor;
use crate::config::SyncConfig;
use crate::drag::{DragHandle, DragReorderCoordinator, DropProposal};
use crate::error::{SyncError, SyncResult};
use crate::model::{MutationEvent, SectionId, SectionProperty, SectionedModel};
use crate::translate::EventTranslator;
use crate::view::{IndexPath, RenderingSurface, ViewOperation};

struct Connections {
    _sections: ConnectionGuard<MutationEvent>,
    _items: ConnectionGuard<(SectionId, MutationEvent)>,
    _properties: ConnectionGuard<(SectionId, SectionProperty)>,
}

/// Observes a [`SectionedModel`] and drives a [`RenderingSurface`].
///
/// Every model event is translated and applied as its own transaction, in
/// the order the events arrive. Drag-and-drop goes through
/// [`perform_drop`](Self::perform_drop), which updates model and surface
/// without the model's events being translated a second time.
///
/// The synchronizer belongs to the thread that attached it. With
/// [`SyncConfig::enforce_thread_affinity`] set, calls from any other thread
/// fail with [`SyncError::WrongThread`]; events emitted on another thread are
/// logged and dropped.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use parking_lot::Mutex;
/// use horizon_listsync::model::{Item, ObservableCollection, Section, SectionedModel};
/// use horizon_listsync::view::RecordingSurface;
/// use horizon_listsync::{ListSynchronizer, SyncConfig};
///
/// let model = Arc::new(SectionedModel::with_sections([Section::with_items(
///     "General",
///     vec![Item::new("About"), Item::new("Software Update")],
/// )]));
/// let surface = Arc::new(Mutex::new(RecordingSurface::attached(&model)));
/// let sync = ListSynchronizer::attach(model.clone(), surface.clone(), SyncConfig::default());
///
/// model.section(0).unwrap().mutate(|items| items.push(Item::new("Storage")));
///
/// assert_eq!(surface.lock().row_counts(), &[3]);
/// # drop(sync);
/// ```
pub struct ListSynchronizer<T, S> {
    model: Arc<SectionedModel<T>>,
    surface: Arc<Mutex<S>>,
    config: SyncConfig,
    translator: EventTranslator,
    executor: BatchExecutor,
    drag: DragReorderCoordinator,
    affinity: ThreadAffinity,
    connections: Mutex<Option<Connections>>,
}

impl<T, S> ListSynchronizer<T, S>
where
    T: Send + Sync + 'static,
    S: RenderingSurface + Send + 'static,
{
    /// Starts synchronizing `surface` with `model` on the current thread.
    ///
    /// The surface is assumed to already reflect the model, or to be cold.
    pub fn attach(
        model: Arc<SectionedModel<T>>,
        surface: Arc<Mutex<S>>,
        config: SyncConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let signals = model.signals();
            let connections = Connections {
                _sections: {
                    let weak = weak.clone();
                    signals.sections_changed.connect_scoped(move |event| {
                        if let Some(this) = weak.upgrade() {
                            this.report(this.handle_section_event(event));
                        }
                    })
                },
                _items: {
                    let weak = weak.clone();
                    signals.items_changed.connect_scoped(move |(section, event)| {
                        if let Some(this) = weak.upgrade() {
                            this.report(this.handle_item_event(*section, event));
                        }
                    })
                },
                _properties: {
                    let weak = weak.clone();
                    signals
                        .section_property_changed
                        .connect_scoped(move |(section, property)| {
                            if let Some(this) = weak.upgrade() {
                                this.report(this.handle_property_change(*section, *property));
                            }
                        })
                },
            };
            tracing::debug!(target: targets::SYNC, sections = model.len(), "synchronizer attached");

            Self {
                translator: EventTranslator::new(&config),
                drag: DragReorderCoordinator::new(config.drag.clone()),
                executor: BatchExecutor::new(),
                affinity: ThreadAffinity::current(),
                connections: Mutex::new(Some(connections)),
                model,
                surface,
                config,
            }
        })
    }

    /// Stops observing the model. The surface is left as it is.
    pub fn detach(&self) {
        if self.connections.lock().take().is_some() {
            tracing::debug!(target: targets::SYNC, "synchronizer detached");
        }
    }

    /// Returns `true` until [`detach`](Self::detach) is called.
    pub fn is_attached(&self) -> bool {
        self.connections.lock().is_some()
    }

    /// The observed model.
    pub fn model(&self) -> &Arc<SectionedModel<T>> {
        &self.model
    }

    /// The driven surface.
    pub fn surface(&self) -> &Arc<Mutex<S>> {
        &self.surface
    }

    /// The active configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Number of transactions applied to the surface so far.
    pub fn transactions(&self) -> u64 {
        self.executor.committed()
    }

    // -------------------------------------------------------------------------
    // Event handling
    // -------------------------------------------------------------------------

    /// Translates and applies a section-scoped event. Returns the number of
    /// view operations applied.
    pub fn handle_section_event(&self, event: &MutationEvent) -> SyncResult<usize> {
        self.apply_with(|translator, realized| translator.translate(event, None, realized))
    }

    /// Translates and applies an item-scoped event from `section`.
    pub fn handle_item_event(&self, section: SectionId, event: &MutationEvent) -> SyncResult<usize> {
        self.check_thread()?;
        let index = self.model.section_index(section).ok_or_else(|| {
            SyncError::invalid_event(format!("{section} is not part of the model"))
        })?;
        self.apply_with(|translator, realized| translator.translate(event, Some(index), realized))
    }

    /// Applies a section presentation change.
    pub fn handle_property_change(
        &self,
        section: SectionId,
        property: SectionProperty,
    ) -> SyncResult<usize> {
        self.check_thread()?;
        let Some(index) = self.model.section_index(section) else {
            return Ok(0);
        };
        self.apply_with(|translator, realized| {
            Ok(translator.translate_property(property, index, realized))
        })
    }

    /// Reloads the whole surface from the model.
    pub fn reload(&self) -> SyncResult<usize> {
        self.apply_with(|_, _| Ok(vec![ViewOperation::FullReload]))
    }

    fn apply_with(
        &self,
        translate: impl FnOnce(&EventTranslator, bool) -> SyncResult<Vec<ViewOperation>>,
    ) -> SyncResult<usize> {
        self.check_thread()?;
        if self.executor.is_in_transaction() {
            return Err(SyncError::TransactionInProgress);
        }
        let mut surface = self.surface.lock();
        let ops = translate(&self.translator, surface.has_realized_rows())?;
        self.executor.execute(&mut *surface, ops)
    }

    // -------------------------------------------------------------------------
    // Drag and drop
    // -------------------------------------------------------------------------

    /// Starts a drag at `source`. `Ok(None)` means nothing can be dragged
    /// from there.
    pub fn begin_drag(&self, source: IndexPath) -> SyncResult<Option<DragHandle>> {
        self.check_thread()?;
        Ok(self.drag.begin_drag(&self.model, source))
    }

    /// Returns `true` if the section at `dest` accepts drops.
    pub fn can_drop(&self, dest: IndexPath) -> bool {
        self.drag.can_drop(&self.model, dest)
    }

    /// The proposal for a drag of `item_count` items hovering over `dest`.
    pub fn drop_proposal(&self, dest: Option<IndexPath>, item_count: usize) -> DropProposal {
        self.drag.drop_proposal(&self.model, dest, item_count)
    }

    /// Applies a drop. See [`DragReorderCoordinator::perform_drop`].
    pub fn perform_drop(&self, handle: &DragHandle, dest: IndexPath) -> SyncResult<bool> {
        self.check_thread()?;
        let mut surface = self.surface.lock();
        self.drag
            .perform_drop(&self.model, &self.executor, &mut *surface, handle, dest)
    }

    /// Applies a drop whose origin is only known from the drag session's text
    /// payload (`"<section>,<row>"`).
    ///
    /// A payload that does not parse, or that points at no item, cancels the
    /// drop.
    pub fn perform_drop_payload(&self, payload: &str, dest: IndexPath) -> SyncResult<bool> {
        self.check_thread()?;
        let source = match payload.parse::<IndexPath>() {
            Ok(source) => source,
            Err(err) => {
                tracing::warn!(target: targets::DRAG, %err, "foreign drag payload");
                return Ok(false);
            }
        };
        match self.drag.resolve(&self.model, source) {
            Some(handle) => self.perform_drop(&handle, dest),
            None => {
                tracing::warn!(target: targets::DRAG, %source, "drag payload points at no item");
                Ok(false)
            }
        }
    }

    fn check_thread(&self) -> SyncResult<()> {
        if self.config.enforce_thread_affinity {
            self.affinity.check()?;
        }
        Ok(())
    }

    fn report(&self, result: SyncResult<usize>) {
        match result {
            Ok(applied) => {
                tracing::trace!(target: targets::SYNC, applied, "event synchronized");
            }
            Err(err) => {
                tracing::error!(target: targets::SYNC, %err, "failed to synchronize event");
            }
        }
    }
}

//! The sectioned model: an ordered list of sections.

use std::sync::Arc;

use parking_lot::RwLock;

use horizon_listsync_core::logging::targets;
use horizon_listsync_core::{ConnectionGuard, Signal};

use super::event::{EventScope, MutationEvent};
use super::section::{Section, SectionId, SectionProperty};
use crate::error::{SyncError, SyncResult};

/// Signals emitted by a [`SectionedModel`].
///
/// Item and property events of every section are forwarded here tagged with
/// the originating [`SectionId`]. The id, not the index, is carried because
/// section indices shift as sections are added and removed.
pub struct ModelSignals {
    /// Section-scoped structural changes.
    pub sections_changed: Signal<MutationEvent>,
    /// Item-scoped changes within one section.
    pub items_changed: Signal<(SectionId, MutationEvent)>,
    /// A section presentation attribute changed.
    pub section_property_changed: Signal<(SectionId, SectionProperty)>,
}

impl Default for ModelSignals {
    fn default() -> Self {
        Self {
            sections_changed: Signal::new(),
            items_changed: Signal::new(),
            section_property_changed: Signal::new(),
        }
    }
}

struct Entry<T> {
    section: Arc<Section<T>>,
    _items: ConnectionGuard<MutationEvent>,
    _properties: ConnectionGuard<SectionProperty>,
}

impl<T: Send + Sync + 'static> Entry<T> {
    fn attach(section: Arc<Section<T>>, signals: &Arc<ModelSignals>) -> Self {
        let id = section.id();
        let items = {
            let signals = signals.clone();
            section.items_changed().connect_scoped(move |event| {
                signals.items_changed.emit((id, *event));
            })
        };
        let properties = {
            let signals = signals.clone();
            section.property_changed().connect_scoped(move |property| {
                signals.section_property_changed.emit((id, *property));
            })
        };
        Self {
            section,
            _items: items,
            _properties: properties,
        }
    }
}

/// An ordered sequence of [`Section`]s.
///
/// Section order is the single source of truth for view section indices.
/// Like [`ObservableVec`](super::ObservableVec), every structural operation
/// mutates first and emits afterwards, with no lock held during emission.
///
/// # Example
///
/// ```
/// use horizon_listsync::model::{Item, Section, SectionedModel};
///
/// let model = SectionedModel::new();
/// model.push_section(Section::with_items("General", vec![Item::new("About")]));
/// model.push_section(Section::new("Privacy"));
///
/// assert_eq!(model.len(), 2);
/// assert_eq!(model.row_count(0), Some(1));
/// ```
pub struct SectionedModel<T> {
    sections: RwLock<Vec<Entry<T>>>,
    signals: Arc<ModelSignals>,
}

impl<T: Send + Sync + 'static> Default for SectionedModel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> SectionedModel<T> {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self {
            sections: RwLock::new(Vec::new()),
            signals: Arc::new(ModelSignals::default()),
        }
    }

    /// Creates a model holding `sections`. Nothing is emitted.
    pub fn with_sections(sections: impl IntoIterator<Item = Section<T>>) -> Self {
        let model = Self::new();
        {
            let mut entries = model.sections.write();
            for section in sections {
                entries.push(Entry::attach(Arc::new(section), &model.signals));
            }
        }
        model
    }

    /// The model's signals.
    pub fn signals(&self) -> &ModelSignals {
        &self.signals
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.read().len()
    }

    /// Returns `true` if the model has no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.read().is_empty()
    }

    /// The section at `index`.
    pub fn section(&self, index: usize) -> Option<Arc<Section<T>>> {
        self.sections
            .read()
            .get(index)
            .map(|entry| entry.section.clone())
    }

    /// The section at `index`, or [`SyncError::SectionOutOfRange`].
    pub fn try_section(&self, index: usize) -> SyncResult<Arc<Section<T>>> {
        let sections = self.sections.read();
        sections
            .get(index)
            .map(|entry| entry.section.clone())
            .ok_or(SyncError::SectionOutOfRange {
                index,
                len: sections.len(),
            })
    }

    /// Current index of the section with the given id.
    pub fn section_index(&self, id: SectionId) -> Option<usize> {
        self.sections
            .read()
            .iter()
            .position(|entry| entry.section.id() == id)
    }

    /// Number of items in the section at `index`.
    pub fn row_count(&self, index: usize) -> Option<usize> {
        self.section(index).map(|section| section.row_count())
    }

    /// Item count of every section, in order.
    pub fn row_counts(&self) -> Vec<usize> {
        self.sections()
            .iter()
            .map(|section| section.row_count())
            .collect()
    }

    /// All sections, in order.
    pub fn sections(&self) -> Vec<Arc<Section<T>>> {
        self.sections
            .read()
            .iter()
            .map(|entry| entry.section.clone())
            .collect()
    }

    // -------------------------------------------------------------------------
    // Emitting mutations
    // -------------------------------------------------------------------------

    /// Appends a section, emitting a section Add.
    pub fn push_section(&self, section: impl Into<Arc<Section<T>>>) -> Arc<Section<T>> {
        let section = section.into();
        let index = {
            let mut sections = self.sections.write();
            sections.push(Entry::attach(section.clone(), &self.signals));
            sections.len() - 1
        };
        self.emit(MutationEvent::added(EventScope::Section, index, 1));
        section
    }

    /// Inserts a section at `index`, emitting a section Add.
    pub fn insert_section(
        &self,
        index: usize,
        section: impl Into<Arc<Section<T>>>,
    ) -> SyncResult<Arc<Section<T>>> {
        let section = self.insert_entry(index, section.into())?;
        self.emit(MutationEvent::added(EventScope::Section, index, 1));
        Ok(section)
    }

    /// Removes the section at `index`, emitting a section Remove.
    ///
    /// The removed section's events stop being forwarded.
    pub fn remove_section(&self, index: usize) -> Option<Arc<Section<T>>> {
        let removed = self.remove_entry(index)?;
        self.emit(MutationEvent::removed(EventScope::Section, index, 1));
        Some(removed)
    }

    /// Replaces the section at `index`, emitting a section Replace.
    /// Returns the previous section.
    pub fn replace_section(
        &self,
        index: usize,
        section: impl Into<Arc<Section<T>>>,
    ) -> SyncResult<Arc<Section<T>>> {
        let entry = Entry::attach(section.into(), &self.signals);
        let old = {
            let mut sections = self.sections.write();
            let len = sections.len();
            let slot = sections
                .get_mut(index)
                .ok_or(SyncError::SectionOutOfRange { index, len })?;
            std::mem::replace(slot, entry)
        };
        self.emit(MutationEvent::replaced(EventScope::Section, index, 1));
        Ok(old.section)
    }

    /// Moves a section, emitting a section Move.
    pub fn move_section(&self, from: usize, to: usize) -> bool {
        {
            let mut sections = self.sections.write();
            if from >= sections.len() || to >= sections.len() {
                return false;
            }
            if from == to {
                return true;
            }
            let entry = sections.remove(from);
            sections.insert(to, entry);
        }
        self.emit(MutationEvent::moved(EventScope::Section, from, to, 1));
        true
    }

    /// Replaces every section, emitting a section Reset.
    pub fn reset_sections(
        &self,
        sections: impl IntoIterator<Item = Section<T>>,
    ) -> Vec<Arc<Section<T>>> {
        let entries: Vec<Entry<T>> = sections
            .into_iter()
            .map(|section| Entry::attach(Arc::new(section), &self.signals))
            .collect();
        let old = std::mem::replace(&mut *self.sections.write(), entries);
        self.emit(MutationEvent::reset(EventScope::Section));
        old.into_iter().map(|entry| entry.section).collect()
    }

    // -------------------------------------------------------------------------
    // Silent mutations
    // -------------------------------------------------------------------------

    /// Inserts a section without emitting a section event.
    pub fn insert_section_silently(
        &self,
        index: usize,
        section: impl Into<Arc<Section<T>>>,
    ) -> SyncResult<Arc<Section<T>>> {
        self.insert_entry(index, section.into())
    }

    /// Removes a section without emitting a section event.
    pub fn remove_section_silently(&self, index: usize) -> Option<Arc<Section<T>>> {
        self.remove_entry(index)
    }

    fn insert_entry(&self, index: usize, section: Arc<Section<T>>) -> SyncResult<Arc<Section<T>>> {
        let mut sections = self.sections.write();
        if index > sections.len() {
            return Err(SyncError::SectionOutOfRange {
                index,
                len: sections.len(),
            });
        }
        sections.insert(index, Entry::attach(section.clone(), &self.signals));
        Ok(section)
    }

    fn remove_entry(&self, index: usize) -> Option<Arc<Section<T>>> {
        let mut sections = self.sections.write();
        (index < sections.len()).then(|| sections.remove(index).section)
    }

    fn emit(&self, event: MutationEvent) {
        tracing::trace!(target: targets::MODEL, %event, "sections changed");
        self.signals.sections_changed.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Item, ObservableCollection};
    use parking_lot::Mutex;

    fn model() -> SectionedModel<&'static str> {
        SectionedModel::with_sections([
            Section::with_items("A", vec![Item::new("x"), Item::new("y"), Item::new("z")]),
            Section::with_items("B", vec![Item::new("u")]),
        ])
    }

    #[test]
    fn test_queries() {
        let model = model();
        assert_eq!(model.len(), 2);
        assert_eq!(model.row_counts(), vec![3, 1]);
        let b = model.section(1).unwrap();
        assert_eq!(model.section_index(b.id()), Some(1));
        assert!(model.section(2).is_none());
        assert!(matches!(
            model.try_section(5),
            Err(SyncError::SectionOutOfRange { index: 5, len: 2 })
        ));
    }

    #[test]
    fn test_section_events() {
        let model = model();
        let events = Arc::new(Mutex::new(Vec::new()));
        let recv = events.clone();
        model
            .signals()
            .sections_changed
            .connect(move |event| recv.lock().push(*event));

        model.insert_section(1, Section::new("C")).unwrap();
        assert!(model.insert_section(9, Section::new("D")).is_err());
        model.remove_section(0).unwrap();
        model.replace_section(0, Section::new("C2")).unwrap();
        assert!(model.move_section(0, 1));
        model.reset_sections([Section::new("only")]);

        let events = events.lock();
        assert_eq!(
            *events,
            vec![
                MutationEvent::added(EventScope::Section, 1, 1),
                MutationEvent::removed(EventScope::Section, 0, 1),
                MutationEvent::replaced(EventScope::Section, 0, 1),
                MutationEvent::moved(EventScope::Section, 0, 1, 1),
                MutationEvent::reset(EventScope::Section),
            ]
        );
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_item_events_are_tagged_with_section() {
        let model = model();
        let events = Arc::new(Mutex::new(Vec::new()));
        let recv = events.clone();
        model
            .signals()
            .items_changed
            .connect(move |tagged| recv.lock().push(*tagged));

        let b = model.section(1).unwrap();
        b.mutate(|items| items.push(Item::new("v")));

        assert_eq!(
            *events.lock(),
            vec![(b.id(), MutationEvent::added(EventScope::Item, 1, 1))]
        );
    }

    #[test]
    fn test_removed_section_stops_forwarding() {
        let model = model();
        let count = Arc::new(Mutex::new(0));
        let recv = count.clone();
        model
            .signals()
            .items_changed
            .connect(move |_| *recv.lock() += 1);
        let props = Arc::new(Mutex::new(0));
        let recv = props.clone();
        model
            .signals()
            .section_property_changed
            .connect(move |_| *recv.lock() += 1);

        let removed = model.remove_section_silently(0).unwrap();
        removed.mutate(|items| items.remove(0));
        removed.set_visible(false);

        assert_eq!(*count.lock(), 0);
        assert_eq!(*props.lock(), 0);
        assert_eq!(removed.items_changed().connection_count(), 0);
    }

    #[test]
    fn test_silent_section_ops_do_not_emit() {
        let model = model();
        let count = Arc::new(Mutex::new(0));
        let recv = count.clone();
        model
            .signals()
            .sections_changed
            .connect(move |_| *recv.lock() += 1);

        let section = model.insert_section_silently(0, Section::new("Z")).unwrap();
        assert_eq!(model.section_index(section.id()), Some(0));
        assert!(model.remove_section_silently(0).is_some());
        assert_eq!(*count.lock(), 0);
    }
}

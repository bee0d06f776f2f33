//! Sections: named, ordered groups of items.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use horizon_listsync_core::logging::targets;
use horizon_listsync_core::{ConnectionId, Signal};

use super::collection::{ObservableCollection, ObservableVec};
use super::event::{EventScope, MutationEvent};
use super::item::Item;

static SECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Section`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(u64);

impl SectionId {
    fn next() -> Self {
        Self(SECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "section#{}", self.0)
    }
}

/// Section attributes whose change affects how the section is presented.
///
/// This is a closed set: observers dispatch on it with an exhaustive
/// `match` rather than comparing property names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionProperty {
    /// [`Section::is_visible`] changed.
    Visible,
    /// [`Section::title`] changed.
    Title,
    /// [`Section::footer_text`] changed.
    FooterText,
    /// [`Section::header_height`] changed.
    HeaderHeight,
    /// [`Section::is_drag_sortable`] changed.
    DragSortable,
}

#[derive(Debug, Clone)]
struct SectionState {
    title: Option<String>,
    footer_text: Option<String>,
    header_height: Option<f32>,
    visible: bool,
    drag_sortable: bool,
}

impl Default for SectionState {
    fn default() -> Self {
        Self {
            title: None,
            footer_text: None,
            header_height: None,
            visible: true,
            drag_sortable: false,
        }
    }
}

/// Where a section's items come from. Exactly one is active.
enum ItemSource<T> {
    /// Items owned and managed by the section.
    Managed(Arc<ObservableVec<T>>),
    /// Items owned by an external observable collection.
    Bound(Arc<dyn ObservableCollection<T>>),
}

struct SourceBinding<T> {
    source: ItemSource<T>,
    active: Arc<dyn ObservableCollection<T>>,
    forward: ConnectionId,
}

impl<T: Send + Sync + 'static> SourceBinding<T> {
    fn new(source: ItemSource<T>, target: &Arc<Signal<MutationEvent>>) -> Self {
        let active: Arc<dyn ObservableCollection<T>> = match &source {
            ItemSource::Managed(items) => items.clone(),
            ItemSource::Bound(items) => items.clone(),
        };
        let target = target.clone();
        let forward = active.changed().connect(move |event| {
            target.emit(*event);
        });
        Self {
            source,
            active,
            forward,
        }
    }

    fn disconnect(&self) {
        self.active.changed().disconnect(self.forward);
    }
}

/// A named, ordered group of items.
///
/// A section either manages its own items or is bound to an external
/// [`ObservableCollection`]. Whichever is active, item events are re-emitted
/// on [`items_changed`](Self::items_changed), so observers never need to
/// know which one it is.
///
/// # Example
///
/// ```
/// use horizon_listsync::model::{Item, Section};
///
/// let section = Section::with_items(
///     "Network",
///     vec![Item::new("Wi-Fi"), Item::new("Bluetooth")],
/// )
/// .with_drag_sortable(true);
///
/// section.mutate(|items| items.push(Item::new("VPN")));
/// assert_eq!(section.row_count(), 3);
/// ```
pub struct Section<T> {
    id: SectionId,
    state: RwLock<SectionState>,
    binding: RwLock<SourceBinding<T>>,
    items_changed: Arc<Signal<MutationEvent>>,
    property_changed: Signal<SectionProperty>,
}

impl<T: Send + Sync + 'static> Section<T> {
    /// Creates an empty, manually managed section.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_items(title, Vec::new())
    }

    /// Creates a manually managed section holding `items`.
    pub fn with_items(title: impl Into<String>, items: Vec<Item<T>>) -> Self {
        Self::from_source(title, ItemSource::Managed(Arc::new(ObservableVec::new(items))))
    }

    /// Creates a section bound to an external collection.
    pub fn bound(title: impl Into<String>, source: Arc<dyn ObservableCollection<T>>) -> Self {
        Self::from_source(title, ItemSource::Bound(source))
    }

    fn from_source(title: impl Into<String>, source: ItemSource<T>) -> Self {
        let items_changed = Arc::new(Signal::new());
        let binding = SourceBinding::new(source, &items_changed);
        Self {
            id: SectionId::next(),
            state: RwLock::new(SectionState {
                title: Some(title.into()),
                ..SectionState::default()
            }),
            binding: RwLock::new(binding),
            items_changed,
            property_changed: Signal::new(),
        }
    }

    /// Sets whether items may be dropped into this section.
    pub fn with_drag_sortable(mut self, sortable: bool) -> Self {
        self.state.get_mut().drag_sortable = sortable;
        self
    }

    /// Sets the initial visibility.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.state.get_mut().visible = visible;
        self
    }

    /// Sets the initial footer text.
    pub fn with_footer_text(mut self, footer: impl Into<String>) -> Self {
        self.state.get_mut().footer_text = Some(footer.into());
        self
    }

    /// The section's identity.
    #[inline]
    pub fn id(&self) -> SectionId {
        self.id
    }

    /// Emitted after every item change, whichever source is active.
    pub fn items_changed(&self) -> &Signal<MutationEvent> {
        &self.items_changed
    }

    /// Emitted after a presentation attribute changes value.
    pub fn property_changed(&self) -> &Signal<SectionProperty> {
        &self.property_changed
    }

    // -------------------------------------------------------------------------
    // Items
    // -------------------------------------------------------------------------

    /// The active item collection.
    pub fn items(&self) -> Arc<dyn ObservableCollection<T>> {
        self.binding.read().active.clone()
    }

    /// The section's own list, if it is manually managed.
    pub fn managed_items(&self) -> Option<Arc<ObservableVec<T>>> {
        match &self.binding.read().source {
            ItemSource::Managed(items) => Some(items.clone()),
            ItemSource::Bound(_) => None,
        }
    }

    /// Returns `true` if items come from an external collection.
    pub fn is_bound(&self) -> bool {
        matches!(self.binding.read().source, ItemSource::Bound(_))
    }

    /// Number of items in the active collection.
    pub fn row_count(&self) -> usize {
        self.items().len()
    }

    /// Runs `f` against the active collection. Mutations made through it emit
    /// events as usual.
    pub fn mutate<R>(&self, f: impl FnOnce(&dyn ObservableCollection<T>) -> R) -> R {
        let items = self.items();
        f(items.as_ref())
    }

    /// Returns an editor whose mutations emit no events.
    ///
    /// Only use this when the view has already been told about the change
    /// some other way; otherwise the view falls out of sync.
    pub fn mutate_silently(&self) -> SilentEdit<T> {
        SilentEdit {
            items: self.items(),
        }
    }

    /// Binds the section to an external collection, replacing the current
    /// items. Emits an item Reset.
    pub fn set_items_source(&self, source: Arc<dyn ObservableCollection<T>>) {
        self.rebind(ItemSource::Bound(source));
    }

    /// Drops the external binding and returns to an empty managed list.
    /// Emits an item Reset.
    pub fn clear_items_source(&self) {
        self.rebind(ItemSource::Managed(Arc::new(ObservableVec::default())));
    }

    fn rebind(&self, source: ItemSource<T>) {
        {
            let mut binding = self.binding.write();
            binding.disconnect();
            *binding = SourceBinding::new(source, &self.items_changed);
        }
        tracing::debug!(target: targets::MODEL, section = %self.id, "item source replaced");
        self.items_changed.emit(MutationEvent::reset(EventScope::Item));
    }

    // -------------------------------------------------------------------------
    // Presentation attributes
    // -------------------------------------------------------------------------

    /// The header title.
    pub fn title(&self) -> Option<String> {
        self.state.read().title.clone()
    }

    /// Sets the header title.
    pub fn set_title(&self, title: Option<String>) {
        self.update(SectionProperty::Title, |state| {
            replace_if_changed(&mut state.title, title)
        });
    }

    /// The footer text.
    pub fn footer_text(&self) -> Option<String> {
        self.state.read().footer_text.clone()
    }

    /// Sets the footer text.
    pub fn set_footer_text(&self, footer: Option<String>) {
        self.update(SectionProperty::FooterText, |state| {
            replace_if_changed(&mut state.footer_text, footer)
        });
    }

    /// Explicit header height, if any.
    pub fn header_height(&self) -> Option<f32> {
        self.state.read().header_height
    }

    /// Sets an explicit header height.
    pub fn set_header_height(&self, height: Option<f32>) {
        self.update(SectionProperty::HeaderHeight, |state| {
            replace_if_changed(&mut state.header_height, height)
        });
    }

    /// Whether the section is shown.
    pub fn is_visible(&self) -> bool {
        self.state.read().visible
    }

    /// Shows or hides the section.
    pub fn set_visible(&self, visible: bool) {
        self.update(SectionProperty::Visible, |state| {
            replace_if_changed(&mut state.visible, visible)
        });
    }

    /// Whether items may be dropped into this section.
    pub fn is_drag_sortable(&self) -> bool {
        self.state.read().drag_sortable
    }

    /// Sets whether items may be dropped into this section.
    pub fn set_drag_sortable(&self, sortable: bool) {
        self.update(SectionProperty::DragSortable, |state| {
            replace_if_changed(&mut state.drag_sortable, sortable)
        });
    }

    fn update(&self, property: SectionProperty, apply: impl FnOnce(&mut SectionState) -> bool) {
        let changed = apply(&mut self.state.write());
        if changed {
            self.property_changed.emit(property);
        }
    }
}

impl<T> Drop for Section<T> {
    fn drop(&mut self) {
        let binding = self.binding.get_mut();
        binding.active.changed().disconnect(binding.forward);
    }
}

impl<T> fmt::Debug for Section<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Section")
            .field("id", &self.id)
            .field("title", &state.title)
            .field("visible", &state.visible)
            .field("drag_sortable", &state.drag_sortable)
            .finish_non_exhaustive()
    }
}

/// Silent editor returned by [`Section::mutate_silently`].
pub struct SilentEdit<T> {
    items: Arc<dyn ObservableCollection<T>>,
}

impl<T> SilentEdit<T> {
    /// Removes the item at `index` without emitting an event.
    pub fn remove(&self, index: usize) -> Option<Item<T>> {
        self.items.remove_silently(index)
    }

    /// Inserts `item` at `index` without emitting an event.
    pub fn insert(&self, index: usize, item: Item<T>) -> Result<(), Item<T>> {
        self.items.insert_silently(index, item)
    }
}

fn replace_if_changed<V: PartialEq>(slot: &mut V, value: V) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

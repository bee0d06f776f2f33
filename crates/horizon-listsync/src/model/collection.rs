//! Observable item collections.
//!
//! A section's items live in something implementing [`ObservableCollection`].
//! Every mutation comes in two flavours:
//!
//! - the plain methods (`insert`, `remove`, ...) mutate and then emit one
//!   [`MutationEvent`] on [`changed`](ObservableCollection::changed);
//! - the `*_silently` methods mutate without emitting anything. They exist
//!   for the drag-reorder path, which updates the view itself and must not
//!   have the same change translated a second time.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use horizon_listsync_core::Signal;
use horizon_listsync_core::logging::targets;

use super::event::{EventIndex, EventScope, MutationEvent};
use super::item::{Item, ItemId};

/// An ordered collection of items that announces its own changes.
///
/// Implement this to bind a section to an external data source. The
/// contract is:
///
/// - the collection is mutated *before* the event is emitted;
/// - each emitting call produces exactly one item-scoped event;
/// - an index that cannot be determined is reported as
///   [`EventIndex::Unknown`], never guessed.
pub trait ObservableCollection<T>: Send + Sync {
    /// Number of items.
    fn len(&self) -> usize;

    /// Returns `true` if there are no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identity of the item at `index`.
    fn item_id(&self, index: usize) -> Option<ItemId>;

    /// Position of the item with the given identity.
    fn position(&self, id: ItemId) -> Option<usize>;

    /// Calls `f` for every item in order.
    fn visit(&self, f: &mut dyn FnMut(usize, &Item<T>));

    /// The signal on which mutation events are emitted.
    fn changed(&self) -> &Signal<MutationEvent>;

    // -------------------------------------------------------------------------
    // Emitting mutations
    // -------------------------------------------------------------------------

    /// Inserts `items` starting at `index`, emitting one Add event.
    ///
    /// Hands the items back if `index > len()`.
    fn insert_many(&self, index: usize, items: Vec<Item<T>>) -> Result<(), Vec<Item<T>>>;

    /// Removes the items in `range`, emitting one Remove event.
    ///
    /// Returns `None` (and emits nothing) if the range is empty or out of bounds.
    fn remove_range(&self, range: Range<usize>) -> Option<Vec<Item<T>>>;

    /// Replaces the item at `index`, emitting one Replace event.
    ///
    /// Hands the new item back if `index` is out of bounds.
    fn replace(&self, index: usize, item: Item<T>) -> Result<Item<T>, Item<T>>;

    /// Moves one item from `from` to `to`, emitting one Move event.
    fn move_item(&self, from: usize, to: usize) -> bool;

    /// Replaces the whole content, emitting one Reset event.
    fn reset(&self, items: Vec<Item<T>>) -> Vec<Item<T>>;

    // -------------------------------------------------------------------------
    // Silent mutations
    // -------------------------------------------------------------------------

    /// Inserts without emitting. Hands the item back if `index > len()`.
    fn insert_silently(&self, index: usize, item: Item<T>) -> Result<(), Item<T>>;

    /// Removes without emitting.
    fn remove_silently(&self, index: usize) -> Option<Item<T>>;

    // -------------------------------------------------------------------------
    // Convenience methods
    // -------------------------------------------------------------------------

    /// Inserts a single item, emitting one Add event.
    fn insert(&self, index: usize, item: Item<T>) -> Result<(), Item<T>> {
        self.insert_many(index, vec![item])
            .map_err(|mut items| items.remove(0))
    }

    /// Appends a single item, emitting one Add event.
    fn push(&self, item: Item<T>) {
        let len = self.len();
        // `len` is always a valid insertion point.
        let _ = self.insert(len, item);
    }

    /// Removes a single item, emitting one Remove event.
    fn remove(&self, index: usize) -> Option<Item<T>> {
        self.remove_range(index..index + 1)
            .and_then(|mut removed| removed.pop())
    }
}

impl<T: Clone> dyn ObservableCollection<T> + '_ {
    /// Clones the payload at `index`.
    pub fn get(&self, index: usize) -> Option<T> {
        let mut out = None;
        self.visit(&mut |i, item| {
            if i == index {
                out = Some(item.payload().clone());
            }
        });
        out
    }

    /// Clones every payload in order.
    pub fn snapshot(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len());
        self.visit(&mut |_, item| out.push(item.payload().clone()));
        out
    }
}

/// The stock [`ObservableCollection`]: a vector behind a read-write lock.
///
/// # Example
///
/// ```
/// use horizon_listsync::model::{Item, ObservableCollection, ObservableVec};
///
/// let list = ObservableVec::new(vec![Item::new("Wi-Fi"), Item::new("Bluetooth")]);
/// list.changed().connect(|event| println!("{event}"));
///
/// list.push(Item::new("Cellular"));
/// assert_eq!(list.len(), 3);
/// ```
pub struct ObservableVec<T> {
    items: RwLock<Vec<Item<T>>>,
    changed: Signal<MutationEvent>,
    reports_indices: AtomicBool,
}

impl<T: Send + Sync + 'static> Default for ObservableVec<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: Send + Sync + 'static> ObservableVec<T> {
    /// Creates a collection holding `items`.
    pub fn new(items: Vec<Item<T>>) -> Self {
        Self {
            items: RwLock::new(items),
            changed: Signal::new(),
            reports_indices: AtomicBool::new(true),
        }
    }

    /// Creates a collection by wrapping each payload in a fresh [`Item`].
    pub fn from_payloads(payloads: impl IntoIterator<Item = T>) -> Self {
        Self::new(payloads.into_iter().map(Item::new).collect())
    }

    /// Controls whether emitted events carry positions.
    ///
    /// When disabled, every event reports [`EventIndex::Unknown`], mimicking a
    /// producer that cannot track where its changes happen.
    pub fn set_reports_indices(&self, reports: bool) {
        self.reports_indices.store(reports, Ordering::Relaxed);
    }

    /// Read-only access to the items.
    pub fn items(&self) -> impl std::ops::Deref<Target = Vec<Item<T>>> + '_ {
        self.items.read()
    }

    /// Provides mutable access to one payload, emitting a Replace event.
    pub fn modify<F, R>(&self, index: usize, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let result = {
            let mut items = self.items.write();
            let item = items.get_mut(index)?;
            f(item.payload_mut())
        };
        self.emit(MutationEvent::replaced(EventScope::Item, self.index(index), 1));
        Some(result)
    }

    fn index(&self, index: usize) -> EventIndex {
        if self.reports_indices.load(Ordering::Relaxed) {
            EventIndex::At(index)
        } else {
            EventIndex::Unknown
        }
    }

    fn emit(&self, event: MutationEvent) {
        tracing::trace!(target: targets::MODEL, %event, "collection changed");
        self.changed.emit(event);
    }
}

impl<T: Send + Sync + 'static> ObservableCollection<T> for ObservableVec<T> {
    fn len(&self) -> usize {
        self.items.read().len()
    }

    fn item_id(&self, index: usize) -> Option<ItemId> {
        self.items.read().get(index).map(Item::id)
    }

    fn position(&self, id: ItemId) -> Option<usize> {
        self.items.read().iter().position(|item| item.id() == id)
    }

    fn visit(&self, f: &mut dyn FnMut(usize, &Item<T>)) {
        for (index, item) in self.items.read().iter().enumerate() {
            f(index, item);
        }
    }

    fn changed(&self) -> &Signal<MutationEvent> {
        &self.changed
    }

    fn insert_many(&self, index: usize, items: Vec<Item<T>>) -> Result<(), Vec<Item<T>>> {
        let count = items.len();
        {
            let mut current = self.items.write();
            if index > current.len() {
                return Err(items);
            }
            let tail = current.split_off(index);
            current.extend(items);
            current.extend(tail);
        }
        if count > 0 {
            self.emit(MutationEvent::added(EventScope::Item, self.index(index), count));
        }
        Ok(())
    }

    fn remove_range(&self, range: Range<usize>) -> Option<Vec<Item<T>>> {
        let start = range.start;
        let removed: Vec<Item<T>> = {
            let mut current = self.items.write();
            if range.is_empty() || range.end > current.len() {
                return None;
            }
            current.drain(range).collect()
        };
        self.emit(MutationEvent::removed(
            EventScope::Item,
            self.index(start),
            removed.len(),
        ));
        Some(removed)
    }

    fn replace(&self, index: usize, item: Item<T>) -> Result<Item<T>, Item<T>> {
        let old = {
            let mut current = self.items.write();
            match current.get_mut(index) {
                Some(slot) => std::mem::replace(slot, item),
                None => return Err(item),
            }
        };
        self.emit(MutationEvent::replaced(EventScope::Item, self.index(index), 1));
        Ok(old)
    }

    fn move_item(&self, from: usize, to: usize) -> bool {
        {
            let mut current = self.items.write();
            if from >= current.len() || to >= current.len() {
                return false;
            }
            if from == to {
                return true;
            }
            let item = current.remove(from);
            current.insert(to, item);
        }
        self.emit(MutationEvent::moved(
            EventScope::Item,
            self.index(from),
            self.index(to),
            1,
        ));
        true
    }

    fn reset(&self, items: Vec<Item<T>>) -> Vec<Item<T>> {
        let old = std::mem::replace(&mut *self.items.write(), items);
        self.emit(MutationEvent::reset(EventScope::Item));
        old
    }

    fn insert_silently(&self, index: usize, item: Item<T>) -> Result<(), Item<T>> {
        let mut current = self.items.write();
        if index > current.len() {
            return Err(item);
        }
        current.insert(index, item);
        Ok(())
    }

    fn remove_silently(&self, index: usize) -> Option<Item<T>> {
        let mut current = self.items.write();
        (index < current.len()).then(|| current.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MutationKind;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn recorded(list: &ObservableVec<&'static str>) -> Arc<Mutex<Vec<MutationEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let recv = events.clone();
        list.changed().connect(move |event| recv.lock().push(*event));
        events
    }

    fn names(list: &ObservableVec<&'static str>) -> Vec<&'static str> {
        (list as &dyn ObservableCollection<_>).snapshot()
    }

    #[test]
    fn test_insert_and_remove_emit() {
        let list = ObservableVec::from_payloads(["x", "y", "z"]);
        let events = recorded(&list);

        list.insert(1, Item::new("w")).unwrap();
        let removed = list.remove(2).unwrap();

        assert_eq!(*removed.payload(), "y");
        assert_eq!(names(&list), vec!["x", "w", "z"]);

        let events = events.lock();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], MutationEvent::added(EventScope::Item, 1, 1));
        assert_eq!(events[1], MutationEvent::removed(EventScope::Item, 2, 1));
    }

    #[test]
    fn test_insert_out_of_bounds_hands_item_back() {
        let list = ObservableVec::from_payloads(["x"]);
        let events = recorded(&list);

        let rejected = list.insert(5, Item::new("y")).unwrap_err();
        assert_eq!(*rejected.payload(), "y");
        assert!(events.lock().is_empty());
    }

    #[test]
    fn test_remove_range_counts() {
        let list = ObservableVec::from_payloads(["a", "b", "c", "d"]);
        let events = recorded(&list);

        let removed = list.remove_range(1..3).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(list.remove_range(3..5).is_none());
        assert!(list.remove_range(1..1).is_none());

        assert_eq!(
            *events.lock(),
            vec![MutationEvent::removed(EventScope::Item, 1, 2)]
        );
    }

    #[test]
    fn test_move_and_replace() {
        let list = ObservableVec::from_payloads(["x", "y", "z"]);
        let events = recorded(&list);

        assert!(list.move_item(0, 2));
        assert_eq!(names(&list), vec!["y", "z", "x"]);

        let old = list.replace(1, Item::new("q")).unwrap();
        assert_eq!(*old.payload(), "z");

        assert!(!list.move_item(0, 3));

        let events = events.lock();
        assert_eq!(events[0], MutationEvent::moved(EventScope::Item, 0, 2, 1));
        assert_eq!(events[1], MutationEvent::replaced(EventScope::Item, 1, 1));
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_silent_mutations_do_not_emit() {
        let list = ObservableVec::from_payloads(["x", "y"]);
        let events = recorded(&list);

        let item = list.remove_silently(0).unwrap();
        let id = item.id();
        list.insert_silently(1, item).unwrap();

        assert_eq!(names(&list), vec!["y", "x"]);
        assert_eq!(list.position(id), Some(1));
        assert!(list.remove_silently(9).is_none());
        assert!(events.lock().is_empty());
    }

    #[test]
    fn test_unknown_indices_mode() {
        let list = ObservableVec::from_payloads(["x"]);
        list.set_reports_indices(false);
        let events = recorded(&list);

        list.push(Item::new("y"));

        let events = events.lock();
        assert_eq!(events[0].kind, MutationKind::Add);
        assert!(events[0].new_index.is_unknown());
    }

    #[test]
    fn test_reset_and_modify() {
        let list = ObservableVec::from_payloads(["x"]);
        let events = recorded(&list);

        list.modify(0, |name| *name = "renamed");
        let old = list.reset(vec![Item::new("a"), Item::new("b")]);

        assert_eq!(*old[0].payload(), "renamed");
        assert_eq!(list.len(), 2);
        let dyn_list: &dyn ObservableCollection<&str> = &list;
        assert_eq!(dyn_list.get(1), Some("b"));
        assert_eq!(dyn_list.get(2), None);
        assert!(list.modify(5, |_| ()).is_none());

        let events = events.lock();
        assert_eq!(events[0].kind, MutationKind::Replace);
        assert!(events[1].is_reset());
    }
}

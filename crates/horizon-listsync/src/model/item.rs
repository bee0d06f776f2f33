//! Items: one row's payload plus a stable identity.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A global counter for generating unique item IDs.
static ITEM_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an [`Item`].
///
/// Identity survives moves between sections: a dragged item is re-parented,
/// never copied, so its id is the same before and after the drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl ItemId {
    fn next() -> Self {
        Self(ITEM_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value.
    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// An opaque payload with an identity.
///
/// Equality is identity: two items holding equal payloads are still
/// different rows.
#[derive(Debug)]
pub struct Item<T> {
    id: ItemId,
    payload: T,
}

impl<T> Item<T> {
    /// Wraps a payload under a fresh id.
    pub fn new(payload: T) -> Self {
        Self {
            id: ItemId::next(),
            payload,
        }
    }

    /// The item's identity.
    #[inline]
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// The payload.
    #[inline]
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Mutable access to the payload. Identity is unaffected.
    #[inline]
    pub fn payload_mut(&mut self) -> &mut T {
        &mut self.payload
    }

    /// Unwraps the payload.
    pub fn into_payload(self) -> T {
        self.payload
    }
}

impl<T> PartialEq for Item<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Item<T> {}

impl<T> From<T> for Item<T> {
    fn from(payload: T) -> Self {
        Self::new(payload)
    }
}

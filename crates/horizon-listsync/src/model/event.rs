//! Mutation events emitted by observable collections.
//!
//! A [`MutationEvent`] describes exactly one structural change that has
//! already been applied to a collection. Producers that cannot say where the
//! change happened report [`EventIndex::Unknown`], which forces the consumer
//! to fall back to a full reload.

use std::fmt;

use crate::error::{SyncError, SyncResult};

/// The kind of change a [`MutationEvent`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    /// Elements were inserted at `new_index`.
    Add,
    /// Elements were removed from `old_index`.
    Remove,
    /// Elements at `old_index` were replaced in place.
    Replace,
    /// Elements moved from `old_index` to `new_index`.
    Move,
    /// The collection changed too much to describe incrementally.
    Reset,
}

/// Whether the event concerns the list of sections or the items of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventScope {
    /// The model's section list changed.
    Section,
    /// The items of a single section changed.
    Item,
}

/// A collection index that may be unknown.
///
/// The conventional integer encoding uses `-1` for [`EventIndex::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EventIndex {
    /// A precise position.
    At(usize),
    /// The producer could not supply a position.
    #[default]
    Unknown,
}

impl EventIndex {
    /// The sentinel used by the integer encoding.
    pub const UNKNOWN_SENTINEL: i64 = -1;

    /// Decodes the integer encoding. Negative values other than `-1` are rejected.
    pub fn from_raw(raw: i64) -> SyncResult<Self> {
        match raw {
            Self::UNKNOWN_SENTINEL => Ok(Self::Unknown),
            n if n < 0 => Err(SyncError::invalid_event(format!("negative index {n}"))),
            n => usize::try_from(n)
                .map(Self::At)
                .map_err(|_| SyncError::invalid_event(format!("index {n} does not fit in usize"))),
        }
    }

    /// Returns the index, or `None` when unknown.
    #[inline]
    pub fn get(self) -> Option<usize> {
        match self {
            Self::At(index) => Some(index),
            Self::Unknown => None,
        }
    }

    /// Returns `true` for [`EventIndex::Unknown`].
    #[inline]
    pub fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl From<usize> for EventIndex {
    fn from(index: usize) -> Self {
        Self::At(index)
    }
}

impl fmt::Display for EventIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(index) => write!(f, "{index}"),
            Self::Unknown => f.write_str("?"),
        }
    }
}

/// One change to a section list or to a section's items.
///
/// Events are transient: the model is mutated first, then the event is
/// emitted once and consumed by whoever keeps a view in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MutationEvent {
    /// What happened.
    pub kind: MutationKind,
    /// Section-level or item-level.
    pub scope: EventScope,
    /// First affected position before the change.
    pub old_index: EventIndex,
    /// First affected position after the change.
    pub new_index: EventIndex,
    /// Number of affected elements.
    pub count: usize,
}

impl MutationEvent {
    /// Creates an event from already-validated parts.
    pub fn new(
        kind: MutationKind,
        scope: EventScope,
        old_index: EventIndex,
        new_index: EventIndex,
        count: usize,
    ) -> Self {
        Self {
            kind,
            scope,
            old_index,
            new_index,
            count,
        }
    }

    /// Decodes an event from the conventional integer encoding.
    ///
    /// `-1` marks an unknown index. Any other negative index, and any
    /// negative count, is a contract violation by the producer.
    pub fn from_raw(
        kind: MutationKind,
        scope: EventScope,
        old_index: i64,
        new_index: i64,
        count: i64,
    ) -> SyncResult<Self> {
        let count = usize::try_from(count)
            .map_err(|_| SyncError::invalid_event(format!("negative count {count}")))?;
        Ok(Self::new(
            kind,
            scope,
            EventIndex::from_raw(old_index)?,
            EventIndex::from_raw(new_index)?,
            count,
        ))
    }

    /// `count` elements were inserted at `index`.
    pub fn added(scope: EventScope, index: impl Into<EventIndex>, count: usize) -> Self {
        Self::new(MutationKind::Add, scope, EventIndex::Unknown, index.into(), count)
    }

    /// `count` elements were removed from `index`.
    pub fn removed(scope: EventScope, index: impl Into<EventIndex>, count: usize) -> Self {
        Self::new(MutationKind::Remove, scope, index.into(), EventIndex::Unknown, count)
    }

    /// `count` elements at `index` were replaced.
    pub fn replaced(scope: EventScope, index: impl Into<EventIndex>, count: usize) -> Self {
        let index = index.into();
        Self::new(MutationKind::Replace, scope, index, index, count)
    }

    /// `count` elements moved from `from` to `to`.
    pub fn moved(
        scope: EventScope,
        from: impl Into<EventIndex>,
        to: impl Into<EventIndex>,
        count: usize,
    ) -> Self {
        Self::new(MutationKind::Move, scope, from.into(), to.into(), count)
    }

    /// The collection was reset.
    pub fn reset(scope: EventScope) -> Self {
        Self::new(
            MutationKind::Reset,
            scope,
            EventIndex::Unknown,
            EventIndex::Unknown,
            0,
        )
    }

    /// Returns `true` if this is a reset event.
    #[inline]
    pub fn is_reset(&self) -> bool {
        self.kind == MutationKind::Reset
    }
}

impl fmt::Display for MutationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}/{:?} old={} new={} count={}",
            self.kind, self.scope, self.old_index, self.new_index, self.count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_from_raw() {
        assert_eq!(EventIndex::from_raw(-1).unwrap(), EventIndex::Unknown);
        assert_eq!(EventIndex::from_raw(0).unwrap(), EventIndex::At(0));
        assert_eq!(EventIndex::from_raw(7).unwrap().get(), Some(7));
        assert!(matches!(
            EventIndex::from_raw(-2),
            Err(SyncError::InvalidEvent { .. })
        ));
    }

    #[test]
    fn test_event_from_raw_rejects_negative_count() {
        let err = MutationEvent::from_raw(MutationKind::Remove, EventScope::Item, 1, -1, -3)
            .unwrap_err();
        assert!(err.to_string().contains("negative count"));
    }

    #[test]
    fn test_event_from_raw_unknown_indices() {
        let event =
            MutationEvent::from_raw(MutationKind::Add, EventScope::Section, -1, -1, 1).unwrap();
        assert!(event.old_index.is_unknown());
        assert!(event.new_index.is_unknown());
        assert_eq!(event.count, 1);
    }

    #[test]
    fn test_constructors() {
        let add = MutationEvent::added(EventScope::Item, 2, 3);
        assert_eq!(add.kind, MutationKind::Add);
        assert_eq!(add.new_index, EventIndex::At(2));
        assert!(add.old_index.is_unknown());

        let replace = MutationEvent::replaced(EventScope::Item, 4, 1);
        assert_eq!(replace.old_index, replace.new_index);

        let reset = MutationEvent::reset(EventScope::Section);
        assert!(reset.is_reset());
        assert_eq!(reset.to_string(), "Reset/Section old=? new=? count=0");
    }
}

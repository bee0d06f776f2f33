//! The data side of a sectioned list.
//!
//! The model is an ordered list of [`Section`]s, each holding an ordered list
//! of [`Item`]s. Every change is announced as a [`MutationEvent`] after it has
//! been applied; the [`ListSynchronizer`](crate::ListSynchronizer) turns those
//! events into view operations.
//!
//! # Core Types
//!
//! - `SectionedModel`: the ordered section list and its `ModelSignals`
//! - `Section`: one group of items with visibility and drag-sortable flags
//! - `ObservableCollection`: the capability a bound item source provides
//! - `ObservableVec`: the stock observable collection
//! - `MutationEvent`: one change, with kind, scope, indices and count
//!
//! # Architecture Overview
//!
//! ```text
//! ┌──────────────────┐  items_changed   ┌──────────────┐
//! │ ObservableVec /  │─────────────────>│   Section    │
//! │ bound collection │                  └──────┬───────┘
//! └──────────────────┘                         │ (SectionId, event)
//!                                              v
//!                      sections_changed ┌──────────────┐
//!                      ────────────────>│ ModelSignals │────> synchronizer
//!                                       └──────────────┘
//! ```

mod collection;
mod event;
mod item;
mod section;
mod sectioned;

pub use collection::{ObservableCollection, ObservableVec};
pub use event::{EventIndex, EventScope, MutationEvent, MutationKind};
pub use item::{Item, ItemId};
pub use section::{Section, SectionId, SectionProperty, SilentEdit};
pub use sectioned::{ModelSignals, SectionedModel};

//! Horizon ListSync - keeps a sectioned list view in step with its model.
//!
//! A [`SectionedModel`](model::SectionedModel) holds sections of items and
//! announces every change as a [`MutationEvent`](model::MutationEvent). A
//! [`ListSynchronizer`] observes those events, translates each into the
//! structural operations a [`RenderingSurface`](view::RenderingSurface)
//! understands, and applies them inside one begin/end transaction per event.
//! Drag-to-reorder across sections goes through the same synchronizer, which
//! moves the item silently and updates the surface itself.
//!
//! ```text
//! model mutation ──> MutationEvent ──> EventTranslator ──> BatchExecutor ──> surface
//!                                                               ^
//! drag gesture ──> DragReorderCoordinator (silent mutation) ────┘
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use horizon_listsync::prelude::*;
//!
//! let model = Arc::new(SectionedModel::with_sections([
//!     Section::with_items("Favorites", vec![Item::new("Alice"), Item::new("Bob")])
//!         .with_drag_sortable(true),
//!     Section::with_items("Others", vec![Item::new("Carol")]).with_drag_sortable(true),
//! ]));
//! let surface = Arc::new(Mutex::new(RecordingSurface::attached(&model)));
//! let sync = ListSynchronizer::attach(model.clone(), surface.clone(), SyncConfig::default());
//!
//! // Programmatic change: translated into InsertRows(1, 1, 1).
//! model.section(1).unwrap().mutate(|items| items.push(Item::new("Dave")));
//!
//! // Drag Bob into "Others": DeleteRows then InsertRows, two transactions.
//! let handle = sync.begin_drag(IndexPath::new(0, 1)).unwrap().unwrap();
//! assert!(sync.perform_drop(&handle, IndexPath::new(1, 0)).unwrap());
//!
//! assert_eq!(surface.lock().row_counts(), &[1, 3]);
//! ```

pub use horizon_listsync_core::*;

pub mod batch;
pub mod config;
pub mod decoration;
pub mod drag;
pub mod error;
pub mod model;
pub mod prelude;
pub mod sync;
pub mod translate;
pub mod view;

pub use batch::BatchExecutor;
pub use config::{ColdSurfacePolicy, DragConfig, MultiRowMoves, SyncConfig};
pub use drag::{DragHandle, DragReorderCoordinator, DropProposal};
pub use error::{SyncError, SyncResult};
pub use sync::ListSynchronizer;
pub use translate::EventTranslator;

static_assertions::assert_impl_all!(model::SectionedModel<String>: Send, Sync);
static_assertions::assert_impl_all!(ListSynchronizer<String, view::RecordingSurface>: Send, Sync);

//! Core systems for Horizon ListSync.
//!
//! This crate provides the foundational pieces the list synchronization
//! engine is built from:
//!
//! - **Signal/Slot System**: Type-safe change notification between the list
//!   model and its observers
//! - **Thread Affinity**: Checks that the model and rendering surface are only
//!   driven from the thread that owns them
//! - **Cancellation**: Cooperative cancellation tokens for background work
//! - **Logging**: Stable `tracing` targets and span names
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_listsync_core::Signal;
//!
//! let row_count_changed = Signal::<usize>::new();
//!
//! let conn_id = row_count_changed.connect(|rows| {
//!     println!("now {} rows", rows);
//! });
//!
//! row_count_changed.emit(3);
//! row_count_changed.disconnect(conn_id);
//! ```

pub mod cancel;
pub mod logging;
pub mod signal;
pub mod thread_check;

pub use cancel::CancellationToken;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use thread_check::{ThreadAffinity, WrongThread};

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);
static_assertions::assert_impl_all!(CancellationToken: Send, Sync);

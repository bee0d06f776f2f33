//! Cooperative cancellation.
//!
//! A [`CancellationToken`] is shared between whoever starts a piece of
//! background work and the work itself. The work polls
//! [`is_cancelled`](CancellationToken::is_cancelled) and bails out early;
//! the starter calls [`cancel`](CancellationToken::cancel) when the result is
//! no longer wanted, for example because a newer request superseded it.
//!
//! # Example
//!
//! ```
//! use horizon_listsync_core::CancellationToken;
//!
//! let token = CancellationToken::new();
//! let worker_token = token.clone();
//!
//! let handle = std::thread::spawn(move || {
//!     for _ in 0..1_000 {
//!         if worker_token.is_cancelled() {
//!             return None;
//!         }
//!     }
//!     Some(42)
//! });
//!
//! token.cancel();
//! let _ = handle.join();
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cancellation token for cooperative task cancellation.
///
/// Clones share the same flag. Once cancelled, a token stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Request cancellation.
    ///
    /// Returns `true` if this call performed the transition.
    pub fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::AcqRel)
    }

    /// Returns `true` if both tokens share the same flag.
    pub fn same_token(&self, other: &CancellationToken) -> bool {
        Arc::ptr_eq(&self.cancelled, &other.cancelled)
    }
}

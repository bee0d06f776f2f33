//! Thread affinity verification for Horizon ListSync.
//!
//! The list model, the synchronizer, and the rendering surface are all owned
//! by one UI-affine thread. Background work (for example decoration loading)
//! may run elsewhere, but must hand its results back to that thread before
//! any view state is touched.
//!
//! # Usage
//!
//! ```
//! use horizon_listsync_core::thread_check::{ThreadAffinity, WrongThread};
//!
//! struct ListDriver {
//!     affinity: ThreadAffinity,
//! }
//!
//! impl ListDriver {
//!     fn new() -> Self {
//!         Self { affinity: ThreadAffinity::current() }
//!     }
//!
//!     fn update(&self) -> Result<(), WrongThread> {
//!         self.affinity.check()?;
//!         Ok(())
//!     }
//! }
//!
//! let driver = ListDriver::new();
//! assert!(driver.update().is_ok());
//! ```

use std::thread::ThreadId;

/// Tracks the thread an object was created on.
///
/// [`check`](Self::check) returns a [`WrongThread`] value so callers can
/// surface the violation as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

/// Describes an access from a thread other than the owning one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrongThread {
    /// The thread the object is bound to.
    pub expected: ThreadId,
    /// The thread that attempted the access.
    pub actual: ThreadId,
}

impl std::fmt::Display for WrongThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "accessed from thread {:?}, but bound to thread {:?}",
            self.actual, self.expected
        )
    }
}

impl std::error::Error for WrongThread {}

impl ThreadAffinity {
    /// Create a new thread affinity tracker for the current thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    /// Get the thread ID this affinity is bound to.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Check if the current thread matches this affinity.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Returns `Err` describing the violation when called from another thread.
    pub fn check(&self) -> Result<(), WrongThread> {
        let actual = std::thread::current().id();
        if actual == self.thread_id {
            Ok(())
        } else {
            Err(WrongThread {
                expected: self.thread_id,
                actual,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_affinity_same_thread() {
        let affinity = ThreadAffinity::current();
        assert!(affinity.is_same_thread());
        assert!(affinity.check().is_ok());
    }

    #[test]
    fn test_thread_affinity_different_thread() {
        let affinity = ThreadAffinity::current();
        let result = std::thread::spawn(move || (affinity.is_same_thread(), affinity.check()))
            .join()
            .unwrap();

        assert!(!result.0);
        let violation = result.1.unwrap_err();
        assert_eq!(violation.expected, affinity.thread_id());
        assert_ne!(violation.actual, violation.expected);
    }

    #[test]
    fn test_thread_affinity_default() {
        let affinity = ThreadAffinity::default();
        assert_eq!(affinity.thread_id(), std::thread::current().id());
    }
}

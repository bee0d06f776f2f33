//! Asynchronous per-row decorative content (icons, thumbnails, ...).
//!
//! Rows ask for content by key; a [`DecorationLoader`] resolves it on a
//! dedicated worker thread. Finished loads are queued and only handed to the
//! caller from [`DecorationSlots::process_completed`], which must run on the
//! thread that owns the view.
//!
//! A newer request for the same item supersedes the older one: the older
//! load's token is cancelled and its result, should it still arrive, is
//! discarded. Racing loads therefore never apply out of order.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use horizon_listsync::decoration::{DecorationLoader, DecorationSlots};
//! use horizon_listsync::model::Item;
//! use horizon_listsync_core::CancellationToken;
//!
//! struct Glyphs;
//!
//! impl DecorationLoader for Glyphs {
//!     type Key = &'static str;
//!     type Content = char;
//!
//!     fn load(&self, key: &&'static str, _token: &CancellationToken) -> Option<char> {
//!         key.chars().next()
//!     }
//! }
//!
//! let slots = DecorationSlots::new(Glyphs).unwrap();
//! let row = Item::new("Wi-Fi");
//! slots.request(row.id(), "wifi").unwrap();
//!
//! let mut icon = None;
//! slots
//!     .process_completed_timeout(Duration::from_secs(5), |_, glyph| icon = Some(glyph))
//!     .unwrap();
//! assert_eq!(icon, Some('w'));
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use parking_lot::Mutex;

use horizon_listsync_core::logging::targets;
use horizon_listsync_core::{CancellationToken, ThreadAffinity};

use crate::error::{SyncError, SyncResult};
use crate::model::ItemId;

/// Resolves decorative content off the UI thread.
///
/// `load` should poll `token` during long work and give up once it is
/// cancelled. Loading the same key twice must be harmless.
pub trait DecorationLoader: Send + Sync + 'static {
    /// What identifies the content to load.
    type Key: Send + 'static;
    /// The loaded content.
    type Content: Send + 'static;

    /// Loads the content for `key`. `None` means there is nothing to show.
    fn load(&self, key: &Self::Key, token: &CancellationToken) -> Option<Self::Content>;
}

enum Job<K> {
    Load {
        item: ItemId,
        generation: u64,
        key: K,
        token: CancellationToken,
    },
    Shutdown,
}

struct Completion<C> {
    item: ItemId,
    generation: u64,
    token: CancellationToken,
    content: Option<C>,
}

struct InFlight {
    generation: u64,
    token: CancellationToken,
}

/// Per-item decoration requests served by one background worker.
pub struct DecorationSlots<L: DecorationLoader> {
    jobs: Sender<Job<L::Key>>,
    completions: Receiver<Completion<L::Content>>,
    in_flight: Mutex<HashMap<ItemId, InFlight>>,
    next_generation: AtomicU64,
    handle: Mutex<Option<JoinHandle<()>>>,
    affinity: ThreadAffinity,
}

impl<L: DecorationLoader> DecorationSlots<L> {
    /// Starts the worker thread. The calling thread becomes the one allowed
    /// to apply results.
    pub fn new(loader: L) -> SyncResult<Self> {
        let (jobs, job_rx) = unbounded::<Job<L::Key>>();
        let (done_tx, completions) = unbounded::<Completion<L::Content>>();
        let handle = thread::Builder::new()
            .name("horizon-decoration".to_owned())
            .spawn(move || worker_loop(&loader, &job_rx, &done_tx))
            .map_err(|err| {
                tracing::error!(target: targets::DECORATION, %err, "failed to spawn decoration worker");
                SyncError::LoaderUnavailable
            })?;

        Ok(Self {
            jobs,
            completions,
            in_flight: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(1),
            handle: Mutex::new(Some(handle)),
            affinity: ThreadAffinity::current(),
        })
    }

    /// Requests content for `item`, superseding any earlier request for it.
    ///
    /// # Errors
    ///
    /// [`SyncError::LoaderUnavailable`] after [`shutdown`](Self::shutdown).
    pub fn request(&self, item: ItemId, key: L::Key) -> SyncResult<()> {
        if !self.is_running() {
            return Err(SyncError::LoaderUnavailable);
        }
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let previous = self.in_flight.lock().insert(
            item,
            InFlight {
                generation,
                token: token.clone(),
            },
        );
        if let Some(previous) = previous {
            previous.token.cancel();
            tracing::trace!(target: targets::DECORATION, %item, "superseded pending load");
        }

        self.jobs
            .send(Job::Load {
                item,
                generation,
                key,
                token,
            })
            .map_err(|_| {
                self.in_flight.lock().remove(&item);
                SyncError::LoaderUnavailable
            })
    }

    /// Cancels the pending request for `item`. Returns `false` if there was
    /// none.
    pub fn cancel(&self, item: ItemId) -> bool {
        match self.in_flight.lock().remove(&item) {
            Some(pending) => {
                pending.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Number of requests not yet applied.
    pub fn pending(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Returns `true` until [`shutdown`](Self::shutdown).
    pub fn is_running(&self) -> bool {
        self.handle.lock().is_some()
    }

    /// Hands every finished, still-current load to `apply`. Returns how many
    /// were applied. Never blocks.
    ///
    /// # Errors
    ///
    /// [`SyncError::WrongThread`] when called off the owning thread.
    pub fn process_completed(&self, apply: impl FnMut(ItemId, L::Content)) -> SyncResult<usize> {
        self.affinity.check()?;
        Ok(self.drain(None, apply))
    }

    /// Like [`process_completed`](Self::process_completed), but first waits up
    /// to `timeout` for a load to finish if none is ready yet.
    pub fn process_completed_timeout(
        &self,
        timeout: Duration,
        apply: impl FnMut(ItemId, L::Content),
    ) -> SyncResult<usize> {
        self.affinity.check()?;
        Ok(self.drain(Some(Instant::now() + timeout), apply))
    }

    fn drain(&self, deadline: Option<Instant>, mut apply: impl FnMut(ItemId, L::Content)) -> usize {
        let mut applied = 0;
        loop {
            let next = match deadline {
                Some(deadline) if applied == 0 && self.pending() > 0 => {
                    let wait = deadline.saturating_duration_since(Instant::now());
                    match self.completions.recv_timeout(wait) {
                        Ok(done) => Some(done),
                        Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
                    }
                }
                _ => self.completions.try_recv().ok(),
            };
            let Some(done) = next else {
                return applied;
            };
            if !self.take_current(&done) {
                tracing::trace!(target: targets::DECORATION, item = %done.item, "discarded stale load");
                continue;
            }
            if let Some(content) = done.content {
                apply(done.item, content);
                applied += 1;
            }
        }
    }

    /// Removes and accepts `done` if it answers the item's latest request.
    fn take_current(&self, done: &Completion<L::Content>) -> bool {
        if done.token.is_cancelled() {
            return false;
        }
        let mut in_flight = self.in_flight.lock();
        match in_flight.get(&done.item) {
            Some(pending) if pending.generation == done.generation => {
                in_flight.remove(&done.item);
                true
            }
            _ => false,
        }
    }

    /// Stops the worker and waits for it to exit. Pending loads are
    /// cancelled.
    pub fn shutdown(&self) {
        let Some(handle) = self.handle.lock().take() else {
            return;
        };
        for (_, pending) in self.in_flight.lock().drain() {
            pending.token.cancel();
        }
        let _ = self.jobs.send(Job::Shutdown);
        if handle.join().is_err() {
            tracing::error!(target: targets::DECORATION, "decoration worker panicked");
        }
        tracing::debug!(target: targets::DECORATION, "decoration worker stopped");
    }
}

impl<L: DecorationLoader> Drop for DecorationSlots<L> {
    fn drop(&mut self) {
        // Don't block in drop; the worker exits once it sees the request.
        if self.handle.get_mut().take().is_some() {
            let _ = self.jobs.send(Job::Shutdown);
        }
    }
}

fn worker_loop<L: DecorationLoader>(
    loader: &L,
    jobs: &Receiver<Job<L::Key>>,
    done: &Sender<Completion<L::Content>>,
) {
    for job in jobs.iter() {
        let Job::Load {
            item,
            generation,
            key,
            token,
        } = job
        else {
            break;
        };
        if token.is_cancelled() {
            continue;
        }
        let content = loader.load(&key, &token);
        let completion = Completion {
            item,
            generation,
            token,
            content,
        };
        if done.send(completion).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Item;
    use std::sync::Arc;

    struct Upper;

    impl DecorationLoader for Upper {
        type Key = String;
        type Content = String;

        fn load(&self, key: &String, token: &CancellationToken) -> Option<String> {
            if key.is_empty() || token.is_cancelled() {
                return None;
            }
            Some(key.to_uppercase())
        }
    }

    fn collect(slots: &DecorationSlots<Upper>) -> Vec<(ItemId, String)> {
        let mut out = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(5);
        while slots.pending() > 0 && Instant::now() < deadline {
            slots
                .process_completed_timeout(Duration::from_millis(50), |item, content| {
                    out.push((item, content))
                })
                .unwrap();
        }
        out
    }

    #[test]
    fn test_load_and_apply() {
        let slots = DecorationSlots::new(Upper).unwrap();
        let a = Item::new(());
        let b = Item::new(());
        slots.request(a.id(), "wifi".into()).unwrap();
        slots.request(b.id(), "vpn".into()).unwrap();

        let mut applied = collect(&slots);
        applied.sort();
        let mut expected = vec![(a.id(), "WIFI".to_owned()), (b.id(), "VPN".to_owned())];
        expected.sort();
        assert_eq!(applied, expected);
        assert_eq!(slots.pending(), 0);
    }

    #[test]
    fn test_newer_request_wins() {
        let slots = DecorationSlots::new(Upper).unwrap();
        let row = Item::new(());
        slots.request(row.id(), "old".into()).unwrap();
        slots.request(row.id(), "new".into()).unwrap();

        assert_eq!(collect(&slots), vec![(row.id(), "NEW".to_owned())]);
    }

    #[test]
    fn test_cancel() {
        let slots = DecorationSlots::new(Upper).unwrap();
        let row = Item::new(());
        slots.request(row.id(), "gone".into()).unwrap();
        assert!(slots.cancel(row.id()));
        assert!(!slots.cancel(row.id()));

        thread::sleep(Duration::from_millis(50));
        assert_eq!(slots.process_completed(|_, _| panic!("cancelled load applied")).unwrap(), 0);
    }

    #[test]
    fn test_empty_content_is_not_applied() {
        let slots = DecorationSlots::new(Upper).unwrap();
        let row = Item::new(());
        slots.request(row.id(), String::new()).unwrap();
        assert!(collect(&slots).is_empty());
        assert_eq!(slots.pending(), 0);
    }

    #[test]
    fn test_shutdown() {
        let slots = DecorationSlots::new(Upper).unwrap();
        let row = Item::new(());
        slots.request(row.id(), "late".into()).unwrap();
        slots.shutdown();
        slots.shutdown();

        assert!(!slots.is_running());
        assert_eq!(slots.pending(), 0);
        assert!(matches!(
            slots.request(row.id(), "after".into()),
            Err(SyncError::LoaderUnavailable)
        ));
    }

    #[test]
    fn test_apply_requires_owning_thread() {
        let slots = Arc::new(DecorationSlots::new(Upper).unwrap());
        let remote = slots.clone();
        let result = thread::spawn(move || remote.process_completed(|_, _| {}))
            .join()
            .unwrap();
        assert!(matches!(result, Err(SyncError::WrongThread(_))));
    }
}

//! Begin/end transactions against a rendering surface.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use horizon_listsync_core::logging::targets;

use crate::error::{SyncError, SyncResult};
use crate::view::{IndexPath, RenderingSurface, ViewOperation};

/// Applies view operations inside begin/end transactions.
///
/// Each call to [`execute`](Self::execute) is one transaction. Operations are
/// applied in the order given. A [`ViewOperation::FullReload`] supersedes
/// everything else in its batch: it is applied alone and the other
/// operations are dropped. Transactions never nest.
#[derive(Debug, Default)]
pub struct BatchExecutor {
    open: AtomicBool,
    committed: AtomicU64,
}

impl BatchExecutor {
    /// Creates an executor with no open transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while a transaction is open.
    pub fn is_in_transaction(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Number of transactions committed so far.
    pub fn committed(&self) -> u64 {
        self.committed.load(Ordering::Relaxed)
    }

    /// Opens a transaction on `surface`. It is committed when the returned
    /// guard is dropped.
    ///
    /// # Errors
    ///
    /// [`SyncError::TransactionInProgress`] if a transaction is already open.
    pub fn begin<'a, S>(&'a self, surface: &'a mut S) -> SyncResult<Transaction<'a, S>>
    where
        S: RenderingSurface + ?Sized,
    {
        if self.open.swap(true, Ordering::AcqRel) {
            return Err(SyncError::TransactionInProgress);
        }
        surface.begin_updates();
        Ok(Transaction {
            executor: self,
            surface,
            applied: 0,
        })
    }

    /// Applies `ops` as one transaction and returns how many were applied.
    ///
    /// An empty batch opens no transaction at all.
    #[tracing::instrument(
        skip_all,
        target = "horizon_listsync::batch",
        level = "debug",
        fields(operations = ops.len())
    )]
    pub fn execute<S>(&self, surface: &mut S, ops: Vec<ViewOperation>) -> SyncResult<usize>
    where
        S: RenderingSurface + ?Sized,
    {
        if ops.is_empty() {
            return Ok(0);
        }
        let ops = if ops.len() > 1 && ops.iter().any(ViewOperation::is_full_reload) {
            tracing::debug!(
                target: targets::BATCH,
                discarded = ops.len() - 1,
                "full reload supersedes batch"
            );
            vec![ViewOperation::FullReload]
        } else {
            ops
        };

        let mut txn = self.begin(surface)?;
        for op in &ops {
            txn.apply(op);
        }
        Ok(txn.applied())
    }
}

/// An open transaction. Dropping it ends the surface update block.
pub struct Transaction<'a, S: RenderingSurface + ?Sized> {
    executor: &'a BatchExecutor,
    surface: &'a mut S,
    applied: usize,
}

impl<S: RenderingSurface + ?Sized> Transaction<'_, S> {
    /// Applies one operation.
    pub fn apply(&mut self, op: &ViewOperation) {
        tracing::trace!(target: targets::BATCH, %op, "apply");
        let surface = &mut *self.surface;
        match *op {
            ViewOperation::InsertRows { animation, .. } => {
                surface.insert_rows(&op.row_paths(), animation)
            }
            ViewOperation::DeleteRows { animation, .. } => {
                surface.delete_rows(&op.row_paths(), animation)
            }
            ViewOperation::ReloadRows { animation, .. } => {
                surface.reload_rows(&op.row_paths(), animation)
            }
            ViewOperation::MoveRow { section, from, to } => {
                surface.move_row(IndexPath::new(section, from), IndexPath::new(section, to))
            }
            ViewOperation::InsertSection { section, animation } => {
                surface.insert_section(section, animation)
            }
            ViewOperation::DeleteSection { section, animation } => {
                surface.delete_section(section, animation)
            }
            ViewOperation::ReloadSection { section, animation } => {
                surface.reload_section(section, animation)
            }
            ViewOperation::FullReload => surface.reload_data(),
        }
        self.applied += 1;
    }

    /// Operations applied so far.
    pub fn applied(&self) -> usize {
        self.applied
    }
}

impl<S: RenderingSurface + ?Sized> Drop for Transaction<'_, S> {
    fn drop(&mut self) {
        self.surface.end_updates();
        self.executor.open.store(false, Ordering::Release);
        self.executor.committed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(target: targets::BATCH, operations = self.applied, "transaction committed");
    }
}

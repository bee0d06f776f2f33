//! The rendering-surface capability.

use super::operation::RowAnimation;
use super::path::IndexPath;

/// A list view that accepts structural updates.
///
/// The surface owns layout and animation; the engine only tells it what
/// changed. All calls arrive between [`begin_updates`](Self::begin_updates)
/// and [`end_updates`](Self::end_updates), except
/// [`reload_data`](Self::reload_data), which is also bracketed but is always
/// the only call in its transaction.
///
/// Implementations must not be driven directly while a
/// [`ListSynchronizer`](crate::ListSynchronizer) is attached; doing so breaks
/// the index correspondence later events rely on.
pub trait RenderingSurface {
    /// Opens a transaction. The surface may defer layout until the matching
    /// [`end_updates`](Self::end_updates).
    fn begin_updates(&mut self);

    /// Closes the transaction opened by [`begin_updates`](Self::begin_updates).
    fn end_updates(&mut self);

    /// Rows appeared at `paths`.
    fn insert_rows(&mut self, paths: &[IndexPath], animation: RowAnimation);

    /// Rows at `paths` disappeared.
    fn delete_rows(&mut self, paths: &[IndexPath], animation: RowAnimation);

    /// Rows at `paths` changed content.
    fn reload_rows(&mut self, paths: &[IndexPath], animation: RowAnimation);

    /// One row moved.
    fn move_row(&mut self, from: IndexPath, to: IndexPath);

    /// A section appeared at `section`.
    fn insert_section(&mut self, section: usize, animation: RowAnimation);

    /// The section at `section` disappeared.
    fn delete_section(&mut self, section: usize, animation: RowAnimation);

    /// The section at `section` must be redrawn.
    fn reload_section(&mut self, section: usize, animation: RowAnimation);

    /// Discard everything and re-query the model.
    fn reload_data(&mut self);

    /// Returns `false` until the surface has laid out at least one row.
    ///
    /// While this is `false` the engine skips incremental updates: the
    /// surface will read the model in full on its first layout anyway.
    fn has_realized_rows(&self) -> bool;
}

//! A headless rendering surface that records what it is told.

use std::fmt;
use std::sync::{Arc, Weak};

use super::operation::RowAnimation;
use super::path::IndexPath;
use super::surface::RenderingSurface;
use crate::model::SectionedModel;

/// One call received by a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    BeginUpdates,
    EndUpdates,
    InsertRows(Vec<IndexPath>, RowAnimation),
    DeleteRows(Vec<IndexPath>, RowAnimation),
    ReloadRows(Vec<IndexPath>, RowAnimation),
    MoveRow(IndexPath, IndexPath),
    InsertSection(usize, RowAnimation),
    DeleteSection(usize, RowAnimation),
    ReloadSection(usize, RowAnimation),
    ReloadData,
}

type RowSource = Box<dyn Fn() -> Vec<usize> + Send + Sync>;

/// A [`RenderingSurface`] with no pixels.
///
/// It keeps a row count per section, updated by every structural call, and
/// logs each call in order. Whenever it has to re-query its data (a full
/// reload, or a section inserted or reloaded) it asks its row source, which
/// is usually the model it is attached to.
///
/// Calls that would corrupt a real table view (deleting a row that is not
/// there, mutating outside a transaction) are not fatal; they are collected
/// in [`inconsistencies`](Self::inconsistencies).
pub struct RecordingSurface {
    rows: Vec<usize>,
    realized: bool,
    depth: usize,
    calls: Vec<SurfaceCall>,
    inconsistencies: Vec<String>,
    source: Option<RowSource>,
}

impl RecordingSurface {
    /// A realized surface showing `rows[s]` rows in section `s`, with no row
    /// source.
    pub fn with_rows(rows: Vec<usize>) -> Self {
        Self {
            rows,
            realized: true,
            depth: 0,
            calls: Vec::new(),
            inconsistencies: Vec::new(),
            source: None,
        }
    }

    /// A surface that has not laid out anything yet.
    pub fn cold() -> Self {
        Self {
            realized: false,
            ..Self::with_rows(Vec::new())
        }
    }

    /// A realized surface mirroring `model`.
    pub fn attached<T: Send + Sync + 'static>(model: &Arc<SectionedModel<T>>) -> Self {
        let model: Weak<SectionedModel<T>> = Arc::downgrade(model);
        let mut surface = Self::cold();
        surface.source = Some(Box::new(move || {
            model
                .upgrade()
                .map(|model| model.row_counts())
                .unwrap_or_default()
        }));
        surface.realize();
        surface
    }

    /// Performs the first layout: re-reads every row count and starts
    /// accepting incremental updates.
    pub fn realize(&mut self) {
        self.reload_counts();
        self.realized = true;
    }

    /// Forces the realized state.
    pub fn set_realized(&mut self, realized: bool) {
        self.realized = realized;
    }

    /// Current row count of every section.
    pub fn row_counts(&self) -> &[usize] {
        &self.rows
    }

    /// Every call received, in order.
    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    /// The calls of each committed transaction, without the begin/end markers.
    pub fn transactions(&self) -> Vec<Vec<SurfaceCall>> {
        let mut out = Vec::new();
        let mut current: Option<Vec<SurfaceCall>> = None;
        for call in &self.calls {
            match call {
                SurfaceCall::BeginUpdates => current = Some(Vec::new()),
                SurfaceCall::EndUpdates => out.extend(current.take()),
                other => {
                    if let Some(txn) = current.as_mut() {
                        txn.push(other.clone());
                    }
                }
            }
        }
        out
    }

    /// Forgets the call log.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Calls that a real surface would have rejected.
    pub fn inconsistencies(&self) -> &[String] {
        &self.inconsistencies
    }

    fn reload_counts(&mut self) {
        if let Some(source) = &self.source {
            self.rows = source();
        }
    }

    fn fresh_count(&self, section: usize) -> usize {
        self.source
            .as_ref()
            .and_then(|source| source().get(section).copied())
            .unwrap_or(0)
    }

    fn record(&mut self, call: SurfaceCall) {
        let bracket = matches!(call, SurfaceCall::BeginUpdates | SurfaceCall::EndUpdates);
        if self.depth == 0 && !bracket {
            self.flag(format!("{call:?} outside a transaction"));
        }
        self.calls.push(call);
    }

    fn flag(&mut self, message: String) {
        tracing::warn!(target: "horizon_listsync::view", %message, "surface inconsistency");
        self.inconsistencies.push(message);
    }

    fn rows_mut(&mut self, section: usize) -> Option<&mut usize> {
        if section >= self.rows.len() {
            let len = self.rows.len();
            self.flag(format!("section {section} out of range ({len} sections)"));
            return None;
        }
        self.rows.get_mut(section)
    }
}

impl RenderingSurface for RecordingSurface {
    fn begin_updates(&mut self) {
        self.record(SurfaceCall::BeginUpdates);
        self.depth += 1;
    }

    fn end_updates(&mut self) {
        if self.depth == 0 {
            self.flag("end_updates without begin_updates".to_owned());
        }
        self.depth = self.depth.saturating_sub(1);
        self.record(SurfaceCall::EndUpdates);
    }

    fn insert_rows(&mut self, paths: &[IndexPath], animation: RowAnimation) {
        self.record(SurfaceCall::InsertRows(paths.to_vec(), animation));
        for path in paths {
            let Some(rows) = self.rows_mut(path.section) else {
                continue;
            };
            if path.row > *rows {
                let rows = *rows;
                self.flag(format!("insert at {path} beyond {rows} rows"));
                continue;
            }
            *rows += 1;
        }
    }

    fn delete_rows(&mut self, paths: &[IndexPath], animation: RowAnimation) {
        self.record(SurfaceCall::DeleteRows(paths.to_vec(), animation));
        for path in paths {
            let Some(rows) = self.rows_mut(path.section) else {
                continue;
            };
            if path.row >= *rows {
                let rows = *rows;
                self.flag(format!("delete at {path} beyond {rows} rows"));
                continue;
            }
            *rows -= 1;
        }
    }

    fn reload_rows(&mut self, paths: &[IndexPath], animation: RowAnimation) {
        self.record(SurfaceCall::ReloadRows(paths.to_vec(), animation));
        for path in paths {
            if let Some(&rows) = self.rows.get(path.section) {
                if path.row >= rows {
                    self.flag(format!("reload at {path} beyond {rows} rows"));
                }
            } else {
                self.flag(format!("reload in missing section {}", path.section));
            }
        }
    }

    fn move_row(&mut self, from: IndexPath, to: IndexPath) {
        self.record(SurfaceCall::MoveRow(from, to));
        for path in [from, to] {
            match self.rows.get(path.section) {
                Some(&rows) if path.row < rows => {}
                _ => self.flag(format!("move endpoint {path} does not exist")),
            }
        }
    }

    fn insert_section(&mut self, section: usize, animation: RowAnimation) {
        self.record(SurfaceCall::InsertSection(section, animation));
        if section > self.rows.len() {
            let len = self.rows.len();
            self.flag(format!("insert section {section} beyond {len} sections"));
            return;
        }
        let count = self.fresh_count(section);
        self.rows.insert(section, count);
    }

    fn delete_section(&mut self, section: usize, animation: RowAnimation) {
        self.record(SurfaceCall::DeleteSection(section, animation));
        if section < self.rows.len() {
            self.rows.remove(section);
        } else {
            let len = self.rows.len();
            self.flag(format!("delete section {section} beyond {len} sections"));
        }
    }

    fn reload_section(&mut self, section: usize, animation: RowAnimation) {
        self.record(SurfaceCall::ReloadSection(section, animation));
        let count = self.fresh_count(section);
        if let Some(rows) = self.rows_mut(section) {
            *rows = count;
        }
    }

    fn reload_data(&mut self) {
        self.record(SurfaceCall::ReloadData);
        self.reload_counts();
    }

    fn has_realized_rows(&self) -> bool {
        self.realized
    }
}

impl fmt::Debug for RecordingSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingSurface")
            .field("rows", &self.rows)
            .field("realized", &self.realized)
            .field("calls", &self.calls.len())
            .field("inconsistencies", &self.inconsistencies)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracks_row_counts() {
        let mut surface = RecordingSurface::with_rows(vec![3, 1]);
        surface.begin_updates();
        surface.delete_rows(&[IndexPath::new(0, 1)], RowAnimation::Fade);
        surface.insert_rows(&[IndexPath::new(1, 0), IndexPath::new(1, 1)], RowAnimation::None);
        surface.end_updates();

        assert_eq!(surface.row_counts(), &[2, 3]);
        assert!(surface.inconsistencies().is_empty());
        assert_eq!(surface.transactions().len(), 1);
    }

    #[test]
    fn test_flags_inconsistencies() {
        let mut surface = RecordingSurface::with_rows(vec![1]);
        surface.delete_rows(&[IndexPath::new(0, 0)], RowAnimation::Automatic);
        surface.begin_updates();
        surface.delete_rows(&[IndexPath::new(0, 0)], RowAnimation::Automatic);
        surface.delete_rows(&[IndexPath::new(4, 0)], RowAnimation::Automatic);
        surface.end_updates();

        assert_eq!(surface.inconsistencies().len(), 3);
    }

    #[test]
    fn test_cold_surface() {
        let mut surface = RecordingSurface::cold();
        assert!(!surface.has_realized_rows());
        surface.set_realized(true);
        assert!(surface.has_realized_rows());
    }
}

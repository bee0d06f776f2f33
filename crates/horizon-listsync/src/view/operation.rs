//! The structural vocabulary a rendering surface accepts.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::path::IndexPath;

/// How the surface should animate a structural change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAnimation {
    /// Let the surface pick.
    #[default]
    Automatic,
    /// No animation.
    None,
    /// Cross-fade.
    Fade,
}

/// One structural instruction for the rendering surface.
///
/// Row operations address a contiguous run of `count` rows starting at
/// `row`; section operations carry only the section index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewOperation {
    /// Rows were inserted.
    InsertRows {
        section: usize,
        row: usize,
        count: usize,
        animation: RowAnimation,
    },
    /// Rows were deleted.
    DeleteRows {
        section: usize,
        row: usize,
        count: usize,
        animation: RowAnimation,
    },
    /// Rows changed content in place.
    ReloadRows {
        section: usize,
        row: usize,
        count: usize,
        animation: RowAnimation,
    },
    /// One row moved within a section.
    MoveRow { section: usize, from: usize, to: usize },
    /// A section was inserted.
    InsertSection { section: usize, animation: RowAnimation },
    /// A section was deleted.
    DeleteSection { section: usize, animation: RowAnimation },
    /// A section changed content or presentation in place.
    ReloadSection { section: usize, animation: RowAnimation },
    /// Everything must be reloaded from the model.
    FullReload,
}

impl ViewOperation {
    /// Returns `true` for [`ViewOperation::FullReload`].
    #[inline]
    pub fn is_full_reload(&self) -> bool {
        matches!(self, Self::FullReload)
    }

    /// The index paths addressed by a row operation; empty for every other
    /// operation.
    pub fn row_paths(&self) -> Vec<IndexPath> {
        match *self {
            Self::InsertRows {
                section, row, count, ..
            }
            | Self::DeleteRows {
                section, row, count, ..
            }
            | Self::ReloadRows {
                section, row, count, ..
            } => {
                let first = IndexPath::new(section, row);
                (0..count).map(|i| first.offset(i)).collect()
            }
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for ViewOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsertRows {
                section, row, count, ..
            } => write!(f, "InsertRows({section},{row},{count})"),
            Self::DeleteRows {
                section, row, count, ..
            } => write!(f, "DeleteRows({section},{row},{count})"),
            Self::ReloadRows {
                section, row, count, ..
            } => write!(f, "ReloadRows({section},{row},{count})"),
            Self::MoveRow { section, from, to } => write!(f, "MoveRow({section},{from},{to})"),
            Self::InsertSection { section, .. } => write!(f, "InsertSection({section})"),
            Self::DeleteSection { section, .. } => write!(f, "DeleteSection({section})"),
            Self::ReloadSection { section, .. } => write!(f, "ReloadSection({section})"),
            Self::FullReload => f.write_str("FullReload"),
        }
    }
}

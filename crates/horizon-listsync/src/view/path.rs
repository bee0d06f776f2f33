//! Row addresses on the rendering surface.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A (section, row) position in the view.
///
/// Index paths are positions, not identities: after the model changes, a
/// previously obtained path may point at a different item or at nothing.
///
/// The text form is `"<section>,<row>"`, which is also the payload carried by
/// a drag session.
///
/// ```
/// use horizon_listsync::view::IndexPath;
///
/// let path: IndexPath = "1,4".parse().unwrap();
/// assert_eq!(path, IndexPath::new(1, 4));
/// assert_eq!(path.to_string(), "1,4");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IndexPath {
    /// Section index.
    pub section: usize,
    /// Row index within the section.
    pub row: usize,
}

impl IndexPath {
    /// Creates an index path.
    #[inline]
    pub const fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }

    /// The path `delta` rows further down the same section.
    #[inline]
    pub const fn offset(self, delta: usize) -> Self {
        Self::new(self.section, self.row + delta)
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.section, self.row)
    }
}

/// Error returned when parsing an [`IndexPath`] from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid index path {input:?}: expected \"<section>,<row>\"")]
pub struct ParseIndexPathError {
    input: String,
}

impl FromStr for IndexPath {
    type Err = ParseIndexPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseIndexPathError {
            input: s.to_owned(),
        };
        let (section, row) = s.split_once(',').ok_or_else(err)?;
        let section = section.trim().parse().map_err(|_| err())?;
        let row = row.trim().parse().map_err(|_| err())?;
        Ok(Self::new(section, row))
    }
}

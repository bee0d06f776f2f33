//! Synchronizer configuration.
//!
//! ```
//! use horizon_listsync::{MultiRowMoves, SyncConfig};
//!
//! let config = SyncConfig::from_toml_str(
//!     r#"
//!     multi_row_moves = "per_unit_shift"
//!
//!     [drag]
//!     require_sortable_origin = true
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.multi_row_moves, MultiRowMoves::PerUnitShift);
//! assert!(config.drag.require_sortable_origin);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::SyncResult;
use crate::view::RowAnimation;

/// How an item Move with `count > 1` is translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiRowMoves {
    /// Reload everything.
    #[default]
    FullReload,
    /// One MoveRow per unit, shifting both indices per unit when moving
    /// towards the front.
    PerUnitShift,
}

/// Which events the cold-surface rule suppresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColdSurfacePolicy {
    /// Only item-scoped, non-Reset events.
    #[default]
    ItemEvents,
    /// Every non-Reset event, section-scoped ones and property changes included.
    AllEvents,
}

/// Drag-and-drop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Refuse to start a drag from a section that is not drag-sortable.
    pub require_sortable_origin: bool,
    /// Animation for the delete half of a drop.
    pub delete_animation: RowAnimation,
    /// Animation for the insert half of a drop.
    pub insert_animation: RowAnimation,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            require_sortable_origin: false,
            delete_animation: RowAnimation::Fade,
            insert_animation: RowAnimation::None,
        }
    }
}

/// Configuration for a [`ListSynchronizer`](crate::ListSynchronizer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Translation of multi-row item moves.
    pub multi_row_moves: MultiRowMoves,
    /// Scope of the cold-surface rule.
    pub cold_surface: ColdSurfacePolicy,
    /// Animation for translated row insertions, deletions and reloads.
    pub row_animation: RowAnimation,
    /// Reject calls from threads other than the one that created the
    /// synchronizer.
    pub enforce_thread_affinity: bool,
    /// Drag-and-drop settings.
    pub drag: DragConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            multi_row_moves: MultiRowMoves::default(),
            cold_surface: ColdSurfacePolicy::default(),
            row_animation: RowAnimation::Automatic,
            enforce_thread_affinity: true,
            drag: DragConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Parses a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> SyncResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Serializes the configuration to TOML.
    pub fn to_toml_string(&self) -> SyncResult<String> {
        Ok(toml::to_string(self)?)
    }

    /// Sets the multi-row move policy.
    pub fn with_multi_row_moves(mut self, policy: MultiRowMoves) -> Self {
        self.multi_row_moves = policy;
        self
    }

    /// Sets the cold-surface policy.
    pub fn with_cold_surface(mut self, policy: ColdSurfacePolicy) -> Self {
        self.cold_surface = policy;
        self
    }

    /// Sets the animation for translated row operations.
    pub fn with_row_animation(mut self, animation: RowAnimation) -> Self {
        self.row_animation = animation;
        self
    }

    /// Enables or disables thread-affinity checks.
    pub fn with_thread_affinity(mut self, enforce: bool) -> Self {
        self.enforce_thread_affinity = enforce;
        self
    }

    /// Sets whether a drag may only start from a drag-sortable section.
    pub fn with_sortable_origin_required(mut self, required: bool) -> Self {
        self.drag.require_sortable_origin = required;
        self
    }
}

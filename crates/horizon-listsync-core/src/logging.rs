//! Logging facilities for Horizon ListSync.
//!
//! Horizon ListSync uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_listsync=debug")
//!     .init();
//! ```
//!
//! Every subsystem logs under one of the [`targets`] so that, for example,
//! translation noise can be silenced while drag handling stays visible.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_listsync_core::signal";
    /// Sectioned model target.
    pub const MODEL: &str = "horizon_listsync::model";
    /// Event translator target.
    pub const TRANSLATE: &str = "horizon_listsync::translate";
    /// Batch executor target.
    pub const BATCH: &str = "horizon_listsync::batch";
    /// Drag-reorder coordinator target.
    pub const DRAG: &str = "horizon_listsync::drag";
    /// Synchronizer wiring target.
    pub const SYNC: &str = "horizon_listsync::sync";
    /// Decoration loader target.
    pub const DECORATION: &str = "horizon_listsync::decoration";
}

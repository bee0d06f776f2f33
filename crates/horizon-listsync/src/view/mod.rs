//! The view side: addresses, operations, and the surface that applies them.

mod operation;
mod path;
mod recording;
mod surface;

pub use operation::{RowAnimation, ViewOperation};
pub use path::{IndexPath, ParseIndexPathError};
pub use recording::{RecordingSurface, SurfaceCall};
pub use surface::RenderingSurface;

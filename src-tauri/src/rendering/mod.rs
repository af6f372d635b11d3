//! GPU rendering for the overlay surface.
//!
//! ## Components
//! - `renderer`: `TriangleRenderer` state machine, pipeline and frame loop
//! - `target`: Drawable targets (native window surface, offscreen texture)
//! - `pacing`: Frame slot pacing for the loop

pub mod pacing;
pub mod renderer;
pub mod target;

pub use pacing::FramePacer;
pub use renderer::{RendererState, TriangleRenderer};
pub use target::{AcquiredFrame, FrameTarget, OffscreenTarget, OpenFlag, WindowTarget};

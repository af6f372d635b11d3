//! Application glue between the overlay core and the Tauri runtime.
//!
//! - `host`: Native overlay windows and render threads (`SurfaceHost` impl)
//! - `events`: Window event handlers

pub mod events;
pub mod host;

pub use host::{TauriSurfaceHost, MAIN_WINDOW_LABEL};

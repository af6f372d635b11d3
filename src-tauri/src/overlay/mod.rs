//! Overlay tracking core.
//!
//! Keeps a native overlay surface locked onto a proxy region of the host
//! layout. Independent of the Tauri runtime so it can be driven by tests.
//!
//! ## Components
//! - `geometry`: Geometry, color and pixel-buffer types
//! - `observer`: Proxy-region samples from host layout reports
//! - `debounce`: Idle/Resizing state machine coalescing sample bursts
//! - `controller`: Surface commands with per-label ordering and idempotence
//! - `orchestrator`: Wires the above for one surface

pub mod controller;
pub mod debounce;
pub mod geometry;
pub mod observer;
pub mod orchestrator;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{OverlaySurfaceController, SurfaceHost, SurfaceRecord};
pub use debounce::{DebounceState, DebounceTimer, ResizeDebouncer, ResizeEvent};
pub use geometry::{Geometry, PixelBuffer, PixelSize, Rgb, SharedColor};
pub use observer::{layout_channel, GeometryObserver, LayoutChange, LayoutSample, ProxyRegion};
pub use orchestrator::{host_event_channel, HostEvent, HostEventSender, Orchestrator};

//! Overlay configuration management.
//!
//! `OverlayConfig` lives behind a `parking_lot::RwLock` so the frontend can
//! replace it in a single IPC call. Orchestrators take a snapshot when a
//! proxy region is attached; later changes apply to the next attach.

pub mod overlay;

pub use overlay::{OverlayConfig, OVERLAY_CONFIG};

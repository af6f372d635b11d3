//! Overlay tracking and rendering settings.

use std::time::Duration;

use lazy_static::lazy_static;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the debounce delay at startup.
pub const DEBOUNCE_ENV: &str = "WGPU_OVERLAY_DEBOUNCE_MS";

lazy_static! {
    /// Global overlay configuration.
    pub static ref OVERLAY_CONFIG: RwLock<OverlayConfig> = RwLock::new(OverlayConfig::from_env());
}

/// Settings shared by the orchestrator and the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayConfig {
    /// Label of the native overlay window.
    pub surface_label: String,
    /// Quiet period after the last layout change before the overlay is updated.
    pub debounce_ms: u64,
    /// Hide the overlay while a resize burst is in flight.
    pub hide_while_resizing: bool,
    /// Prefer the discrete GPU when requesting an adapter.
    pub high_performance_gpu: bool,
    /// Frame slot of the render loop.
    pub frame_interval_ms: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            surface_label: "wgpu1".to_string(),
            debounce_ms: 200,
            hide_while_resizing: true,
            high_performance_gpu: true,
            frame_interval_ms: 16,
        }
    }
}

impl OverlayConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = std::env::var(DEBOUNCE_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => config.debounce_ms = ms,
                Err(e) => log::warn!("[OverlayConfig] Ignoring {}={:?}: {}", DEBOUNCE_ENV, raw, e),
            }
        }
        config
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn power_preference(&self) -> wgpu::PowerPreference {
        if self.high_performance_gpu {
            wgpu::PowerPreference::HighPerformance
        } else {
            wgpu::PowerPreference::LowPower
        }
    }
}

/// Snapshot of the current configuration.
pub fn snapshot() -> OverlayConfig {
    OVERLAY_CONFIG.read().clone()
}

// ============================================================================
// Tauri Commands
// ============================================================================

/// Get the current overlay configuration.
#[tauri::command]
pub fn get_overlay_config() -> OverlayConfig {
    snapshot()
}

/// Replace the overlay configuration (takes effect on the next attach).
#[tauri::command]
pub fn set_overlay_config(config: OverlayConfig) {
    log::debug!("[OverlayConfig] set_overlay_config({:?})", config);
    *OVERLAY_CONFIG.write() = config;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OverlayConfig::default();
        assert_eq!(config.surface_label, "wgpu1");
        assert_eq!(config.debounce_delay(), Duration::from_millis(200));
        assert!(config.hide_while_resizing);
        assert_eq!(
            config.power_preference(),
            wgpu::PowerPreference::HighPerformance
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: OverlayConfig = serde_json::from_str(r#"{"debounceMs": 50}"#).unwrap();
        assert_eq!(config.debounce_ms, 50);
        assert_eq!(config.surface_label, "wgpu1");
        assert_eq!(config.frame_interval(), Duration::from_millis(16));
    }

    #[test]
    fn test_camel_case_serialization() {
        let json = serde_json::to_string(&OverlayConfig::default()).unwrap();
        assert!(json.contains("\"surfaceLabel\":\"wgpu1\""));
        assert!(json.contains("\"hideWhileResizing\":true"));
    }
}

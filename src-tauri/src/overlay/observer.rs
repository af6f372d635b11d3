//! Proxy-region geometry observation.
//!
//! The host layout reports the proxy region once at attach time and then on
//! every layout change. `GeometryObserver` turns those reports into a lazy,
//! non-restartable sequence of samples. The background color is resolved at
//! attach time and reused for every sample.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::geometry::{sanitize_pixel_ratio, Geometry, PixelSize, Rgb};
use crate::error::{OverlayError, OverlayResult};

fn default_pixel_ratio() -> f64 {
    1.0
}

/// Proxy region as resolved by the host layout at attach time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRegion {
    /// Element id of the region in the host layout.
    pub id: String,
    pub bounds: Geometry,
    /// Resolved background color.
    pub background: Rgb,
    #[serde(default = "default_pixel_ratio")]
    pub device_pixel_ratio: f64,
}

/// A layout change reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutChange {
    /// Id of the element whose bounds changed.
    pub region: String,
    pub bounds: Geometry,
    #[serde(default = "default_pixel_ratio")]
    pub device_pixel_ratio: f64,
}

/// Immutable snapshot produced for each observed change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSample {
    pub geometry: Geometry,
    pub color: Rgb,
    pub device_pixel_ratio: f64,
}

impl LayoutSample {
    /// Backing-buffer size for this sample.
    pub fn pixel_size(&self) -> PixelSize {
        self.geometry.pixel_size(self.device_pixel_ratio)
    }
}

pub type LayoutSender = mpsc::UnboundedSender<LayoutChange>;
pub type LayoutReceiver = mpsc::UnboundedReceiver<LayoutChange>;

/// Create the channel carrying layout changes into an observer.
pub fn layout_channel() -> (LayoutSender, LayoutReceiver) {
    mpsc::unbounded_channel()
}

/// Watches one proxy region and yields `(Geometry, Color)` samples.
pub struct GeometryObserver {
    region: String,
    color: Rgb,
    initial: Option<LayoutSample>,
    changes: LayoutReceiver,
}

impl GeometryObserver {
    /// Start observing `region`.
    ///
    /// An absent region is fatal: no observer is created and no sample is
    /// ever produced.
    pub fn attach(region: Option<ProxyRegion>, changes: LayoutReceiver) -> OverlayResult<Self> {
        let region = region.ok_or(OverlayError::MissingProxyRegion)?;
        let color = region.background;
        let initial = LayoutSample {
            geometry: region.bounds,
            color,
            device_pixel_ratio: sanitize_pixel_ratio(region.device_pixel_ratio),
        };

        log::info!(
            "[GeometryObserver] Attached to '{}' at {:?}, background {:?}",
            region.id,
            region.bounds,
            color
        );

        Ok(Self {
            region: region.id,
            color,
            initial: Some(initial),
            changes,
        })
    }

    pub fn region_id(&self) -> &str {
        &self.region
    }

    /// Background color resolved at attach time.
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Next sample, or `None` once the host stops reporting.
    ///
    /// The attach-time sample comes first. Changes for other regions are
    /// skipped. Cancel-safe: dropping the future loses no accepted change.
    pub async fn next_sample(&mut self) -> Option<LayoutSample> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }

        while let Some(change) = self.changes.recv().await {
            if change.region != self.region {
                log::trace!(
                    "[GeometryObserver] Ignoring change for '{}' (watching '{}')",
                    change.region,
                    self.region
                );
                continue;
            }
            return Some(LayoutSample {
                geometry: change.bounds,
                color: self.color,
                device_pixel_ratio: sanitize_pixel_ratio(change.device_pixel_ratio),
            });
        }

        None
    }
}

//! Overlay surface command issuing.
//!
//! `OverlaySurfaceController` maps orchestrator decisions onto commands for
//! the window-management host and keeps the last applied state per label.
//! It enforces the per-label ordering: nothing reaches the host for a label
//! before its `create` succeeded.

use std::collections::HashMap;

use super::geometry::{Geometry, Rgb};
use crate::error::{OverlayError, OverlayResult};

/// Commands understood by the native window-management host.
///
/// Calls are request/response; the controller issues them one at a time.
pub trait SurfaceHost {
    /// Allocate a new native overlay bound to `label`.
    fn create_surface(&mut self, label: &str, geometry: Geometry) -> OverlayResult<()>;

    /// Reposition, resize and recolor an existing overlay.
    ///
    /// The color takes effect on the next rendered frame.
    fn update_surface(&mut self, label: &str, geometry: Geometry, color: Rgb)
        -> OverlayResult<()>;

    /// Move an existing overlay back onto `geometry` after the host window moved.
    fn reposition_surface(&mut self, label: &str, geometry: Geometry) -> OverlayResult<()>;

    fn set_surface_visible(&mut self, label: &str, visible: bool) -> OverlayResult<()>;

    /// Start rendering into the overlay (one-shot per surface).
    fn render_triangle(&mut self, label: &str, color: Rgb) -> OverlayResult<()>;

    /// Toggle the host layout's busy indicator. Cosmetic only.
    fn set_busy(&mut self, label: &str, busy: bool) -> OverlayResult<()>;
}

/// Last state successfully applied to a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceRecord {
    pub geometry: Geometry,
    pub color: Option<Rgb>,
    pub visible: bool,
    pub busy: bool,
    pub rendering: bool,
}

pub struct OverlaySurfaceController<H> {
    host: H,
    surfaces: HashMap<String, SurfaceRecord>,
}

impl<H: SurfaceHost> OverlaySurfaceController<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            surfaces: HashMap::new(),
        }
    }

    pub fn surface(&self, label: &str) -> Option<&SurfaceRecord> {
        self.surfaces.get(label)
    }

    /// Create the surface. Fails if the label already exists.
    pub fn create(&mut self, label: &str, geometry: Geometry) -> OverlayResult<()> {
        if self.surfaces.contains_key(label) {
            return Err(OverlayError::DuplicateSurface {
                label: label.to_string(),
            });
        }

        self.host.create_surface(label, geometry)?;
        log::info!("[OverlayController] Created '{}' at {:?}", label, geometry);

        self.surfaces.insert(
            label.to_string(),
            SurfaceRecord {
                geometry,
                color: None,
                visible: true,
                busy: false,
                rendering: false,
            },
        );
        Ok(())
    }

    /// Start the renderer for the surface. Repeat calls are no-ops.
    pub fn render_triangle(&mut self, label: &str, color: Rgb) -> OverlayResult<()> {
        let record = Self::record(&mut self.surfaces, label)?;
        if record.rendering {
            log::debug!("[OverlayController] '{}' is already rendering", label);
            return Ok(());
        }

        self.host.render_triangle(label, color)?;
        record.rendering = true;
        record.color = Some(color);
        Ok(())
    }

    /// Apply a settled geometry. Identical geometry and color is a no-op.
    pub fn update(&mut self, label: &str, geometry: Geometry, color: Rgb) -> OverlayResult<()> {
        let record = Self::record(&mut self.surfaces, label)?;
        if record.geometry == geometry && record.color == Some(color) {
            log::debug!("[OverlayController] '{}' already at {:?}", label, geometry);
            return Ok(());
        }

        self.host.update_surface(label, geometry, color)?;
        record.geometry = geometry;
        record.color = Some(color);
        log::debug!("[OverlayController] Updated '{}' to {:?}", label, geometry);
        Ok(())
    }

    /// Re-send the last applied geometry, bypassing the idempotence check.
    pub fn realign(&mut self, label: &str) -> OverlayResult<()> {
        let record = Self::record(&mut self.surfaces, label)?;
        self.host.reposition_surface(label, record.geometry)
    }

    pub fn realign_all(&mut self) -> Vec<(String, OverlayError)> {
        let labels: Vec<String> = self.surfaces.keys().cloned().collect();
        labels
            .into_iter()
            .filter_map(|label| self.realign(&label).err().map(|e| (label, e)))
            .collect()
    }

    pub fn hide(&mut self, label: &str) -> OverlayResult<()> {
        self.set_visible(label, false)
    }

    pub fn show(&mut self, label: &str) -> OverlayResult<()> {
        self.set_visible(label, true)
    }

    pub fn show_busy(&mut self, label: &str) -> OverlayResult<()> {
        self.set_busy(label, true)
    }

    pub fn hide_busy(&mut self, label: &str) -> OverlayResult<()> {
        self.set_busy(label, false)
    }

    fn set_visible(&mut self, label: &str, visible: bool) -> OverlayResult<()> {
        let record = Self::record(&mut self.surfaces, label)?;
        if record.visible == visible {
            return Ok(());
        }
        self.host.set_surface_visible(label, visible)?;
        record.visible = visible;
        Ok(())
    }

    fn set_busy(&mut self, label: &str, busy: bool) -> OverlayResult<()> {
        let record = Self::record(&mut self.surfaces, label)?;
        if record.busy == busy {
            return Ok(());
        }
        self.host.set_busy(label, busy)?;
        record.busy = busy;
        Ok(())
    }

    fn record<'a>(
        surfaces: &'a mut HashMap<String, SurfaceRecord>,
        label: &str,
    ) -> OverlayResult<&'a mut SurfaceRecord> {
        surfaces
            .get_mut(label)
            .ok_or_else(|| OverlayError::UnknownSurface {
                label: label.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::testing::{HostCommand, RecordingHost};

    const LABEL: &str = "wgpu1";
    const COLOR: Rgb = Rgb::new(12, 34, 56);

    fn geometry(width: f64) -> Geometry {
        Geometry::new(10.0, 20.0, width, 200.0)
    }

    fn created() -> (OverlaySurfaceController<RecordingHost>, RecordingHost) {
        let host = RecordingHost::default();
        let mut controller = OverlaySurfaceController::new(host.clone());
        controller.create(LABEL, geometry(300.0)).unwrap();
        (controller, host)
    }

    #[test]
    fn commands_before_create_are_rejected() {
        let host = RecordingHost::default();
        let mut controller = OverlaySurfaceController::new(host.clone());

        for result in [
            controller.update(LABEL, geometry(300.0), COLOR),
            controller.hide(LABEL),
            controller.show_busy(LABEL),
            controller.render_triangle(LABEL, COLOR),
            controller.realign(LABEL),
        ] {
            assert!(matches!(result, Err(OverlayError::UnknownSurface { .. })));
        }
        assert!(host.commands().is_empty());
    }

    #[test]
    fn duplicate_create_fails() {
        let (mut controller, host) = created();
        let result = controller.create(LABEL, geometry(500.0));
        assert!(matches!(result, Err(OverlayError::DuplicateSurface { .. })));
        assert_eq!(host.commands().len(), 1);
    }

    #[test]
    fn identical_update_is_idempotent() {
        let (mut controller, host) = created();
        controller.update(LABEL, geometry(400.0), COLOR).unwrap();
        let after_one = host.surface(LABEL);

        controller.update(LABEL, geometry(400.0), COLOR).unwrap();
        assert_eq!(host.surface(LABEL), after_one);
        assert_eq!(host.count(|c| matches!(c, HostCommand::Update { .. })), 1);
    }

    #[test]
    fn failed_update_is_retried_by_next_settle() {
        let (mut controller, host) = created();
        host.fail_next_update();

        assert!(controller.update(LABEL, geometry(400.0), COLOR).is_err());
        assert_eq!(controller.surface(LABEL).unwrap().geometry, geometry(300.0));

        controller.update(LABEL, geometry(400.0), COLOR).unwrap();
        assert_eq!(host.surface(LABEL).unwrap().geometry, geometry(400.0));
    }

    #[test]
    fn render_triangle_is_one_shot() {
        let (mut controller, host) = created();
        controller.render_triangle(LABEL, COLOR).unwrap();
        controller.render_triangle(LABEL, COLOR).unwrap();
        assert_eq!(
            host.count(|c| matches!(c, HostCommand::RenderTriangle { .. })),
            1
        );
        assert!(controller.surface(LABEL).unwrap().rendering);
    }

    #[test]
    fn visibility_and_busy_toggle_only_on_change() {
        let (mut controller, host) = created();
        controller.show(LABEL).unwrap();
        controller.hide(LABEL).unwrap();
        controller.hide(LABEL).unwrap();
        controller.show_busy(LABEL).unwrap();
        controller.show_busy(LABEL).unwrap();
        controller.hide_busy(LABEL).unwrap();

        assert_eq!(
            host.commands()[1..],
            [
                HostCommand::Visible {
                    label: LABEL.into(),
                    visible: false
                },
                HostCommand::Busy {
                    label: LABEL.into(),
                    busy: true
                },
                HostCommand::Busy {
                    label: LABEL.into(),
                    busy: false
                },
            ]
        );
        assert!(!host.surface(LABEL).unwrap().visible);
    }

    #[test]
    fn realign_resends_last_geometry() {
        let (mut controller, host) = created();
        controller.update(LABEL, geometry(400.0), COLOR).unwrap();

        assert!(controller.realign_all().is_empty());
        assert_eq!(
            host.commands().last(),
            Some(&HostCommand::Reposition {
                label: LABEL.into(),
                geometry: geometry(400.0)
            })
        );
    }
}

//! In-memory `SurfaceHost` used by the overlay tests.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::time::Instant;

use super::controller::SurfaceHost;
use super::geometry::{Geometry, Rgb};
use crate::error::{OverlayError, OverlayResult};

#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    Create { label: String, geometry: Geometry },
    Update { label: String, geometry: Geometry, color: Rgb },
    Reposition { label: String, geometry: Geometry },
    Visible { label: String, visible: bool },
    RenderTriangle { label: String, color: Rgb },
    Busy { label: String, busy: bool },
}

/// Native-side view of one simulated overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedSurface {
    pub geometry: Geometry,
    pub color: Option<Rgb>,
    pub visible: bool,
}

#[derive(Default)]
struct Inner {
    log: Vec<(Instant, HostCommand)>,
    surfaces: HashMap<String, SimulatedSurface>,
    fail_next_update: bool,
    fail_render: bool,
}

/// Records every command and simulates the resulting surface state.
///
/// Clones share state so a test can keep a handle after moving the host
/// into a controller.
#[derive(Clone, Default)]
pub struct RecordingHost {
    inner: Arc<Mutex<Inner>>,
}

impl RecordingHost {
    pub fn commands(&self) -> Vec<HostCommand> {
        self.inner.lock().log.iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn timed_commands(&self) -> Vec<(Instant, HostCommand)> {
        self.inner.lock().log.clone()
    }

    pub fn count(&self, predicate: impl Fn(&HostCommand) -> bool) -> usize {
        self.inner.lock().log.iter().filter(|(_, c)| predicate(c)).count()
    }

    pub fn surface(&self, label: &str) -> Option<SimulatedSurface> {
        self.inner.lock().surfaces.get(label).cloned()
    }

    pub fn fail_next_update(&self) {
        self.inner.lock().fail_next_update = true;
    }

    pub fn fail_render(&self) {
        self.inner.lock().fail_render = true;
    }

    fn push(inner: &mut Inner, command: HostCommand) {
        inner.log.push((Instant::now(), command));
    }

    fn existing<'a>(inner: &'a mut Inner, label: &str) -> OverlayResult<&'a mut SimulatedSurface> {
        inner
            .surfaces
            .get_mut(label)
            .ok_or_else(|| OverlayError::UnknownSurface {
                label: label.to_string(),
            })
    }
}

impl SurfaceHost for RecordingHost {
    fn create_surface(&mut self, label: &str, geometry: Geometry) -> OverlayResult<()> {
        let mut inner = self.inner.lock();
        if inner.surfaces.contains_key(label) {
            return Err(OverlayError::DuplicateSurface {
                label: label.to_string(),
            });
        }
        inner.surfaces.insert(
            label.to_string(),
            SimulatedSurface {
                geometry,
                color: None,
                visible: true,
            },
        );
        Self::push(
            &mut inner,
            HostCommand::Create {
                label: label.to_string(),
                geometry,
            },
        );
        Ok(())
    }

    fn update_surface(&mut self, label: &str, geometry: Geometry, color: Rgb) -> OverlayResult<()> {
        let mut inner = self.inner.lock();
        if std::mem::take(&mut inner.fail_next_update) {
            return Err(OverlayError::WindowError("simulated update failure".into()));
        }
        let surface = Self::existing(&mut inner, label)?;
        surface.geometry = geometry;
        surface.color = Some(color);
        Self::push(
            &mut inner,
            HostCommand::Update {
                label: label.to_string(),
                geometry,
                color,
            },
        );
        Ok(())
    }

    fn reposition_surface(&mut self, label: &str, geometry: Geometry) -> OverlayResult<()> {
        let mut inner = self.inner.lock();
        Self::existing(&mut inner, label)?.geometry = geometry;
        Self::push(
            &mut inner,
            HostCommand::Reposition {
                label: label.to_string(),
                geometry,
            },
        );
        Ok(())
    }

    fn set_surface_visible(&mut self, label: &str, visible: bool) -> OverlayResult<()> {
        let mut inner = self.inner.lock();
        Self::existing(&mut inner, label)?.visible = visible;
        Self::push(
            &mut inner,
            HostCommand::Visible {
                label: label.to_string(),
                visible,
            },
        );
        Ok(())
    }

    fn render_triangle(&mut self, label: &str, color: Rgb) -> OverlayResult<()> {
        let mut inner = self.inner.lock();
        if inner.fail_render {
            return Err(OverlayError::NoAdapter("simulated".into()));
        }
        Self::existing(&mut inner, label)?.color = Some(color);
        Self::push(
            &mut inner,
            HostCommand::RenderTriangle {
                label: label.to_string(),
                color,
            },
        );
        Ok(())
    }

    fn set_busy(&mut self, label: &str, busy: bool) -> OverlayResult<()> {
        let mut inner = self.inner.lock();
        Self::push(
            &mut inner,
            HostCommand::Busy {
                label: label.to_string(),
                busy,
            },
        );
        Ok(())
    }
}

//! Tauri implementation of the overlay surface commands.
//!
//! Each overlay is a bare native window (no webview) parented to the main
//! window and positioned at `main inner origin + proxy geometry`, in logical
//! units. Rendering runs on a dedicated thread per overlay.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tauri::{AppHandle, Emitter, LogicalPosition, LogicalSize, Manager, Window, WindowEvent};

use crate::config::OverlayConfig;
use crate::error::{OptionExt, OverlayError, OverlayResult, ResultExt};
use crate::overlay::{Geometry, PixelBuffer, Rgb, SharedColor, SurfaceHost};
use crate::rendering::{FramePacer, OpenFlag, TriangleRenderer, WindowTarget};

/// Label of the webview window hosting the proxy region.
pub const MAIN_WINDOW_LABEL: &str = "main";

/// Event emitted to the main window when the busy indicator toggles.
pub const BUSY_EVENT: &str = "overlay-busy";

#[derive(Debug, Clone, Serialize)]
struct BusyPayload {
    label: String,
    busy: bool,
}

/// State shared between a surface's host commands and its render thread.
#[derive(Default)]
struct SurfaceLink {
    open: OpenFlag,
    color: Arc<SharedColor>,
}

pub struct TauriSurfaceHost {
    app: AppHandle,
    pixel_buffer: Arc<PixelBuffer>,
    power_preference: wgpu::PowerPreference,
    frame_interval: Duration,
    links: HashMap<String, SurfaceLink>,
}

impl TauriSurfaceHost {
    pub fn new(app: AppHandle, config: &OverlayConfig, pixel_buffer: Arc<PixelBuffer>) -> Self {
        Self {
            app,
            pixel_buffer,
            power_preference: config.power_preference(),
            frame_interval: config.frame_interval(),
            links: HashMap::new(),
        }
    }

    fn main_window(&self) -> OverlayResult<Window> {
        self.app
            .get_window(MAIN_WINDOW_LABEL)
            .context("Main window not found")
    }

    fn overlay_window(&self, label: &str) -> OverlayResult<Window> {
        self.app
            .get_window(label)
            .ok_or_else(|| OverlayError::UnknownSurface {
                label: label.to_string(),
            })
    }

    /// Screen position of `geometry`, which is relative to the main window's client area.
    fn screen_position(&self, geometry: Geometry) -> OverlayResult<LogicalPosition<f64>> {
        let main = self.main_window()?;
        let scale = main.scale_factor()?;
        let origin: LogicalPosition<f64> = main.inner_position()?.to_logical(scale);
        Ok(LogicalPosition::new(origin.x + geometry.x, origin.y + geometry.y))
    }
}

impl SurfaceHost for TauriSurfaceHost {
    fn create_surface(&mut self, label: &str, geometry: Geometry) -> OverlayResult<()> {
        if self.app.get_window(label).is_some() {
            return Err(OverlayError::DuplicateSurface {
                label: label.to_string(),
            });
        }

        let main = self.main_window()?;
        let position = self.screen_position(geometry)?;

        let window = tauri::window::WindowBuilder::new(&self.app, label)
            .inner_size(geometry.width, geometry.height)
            .position(position.x, position.y)
            .decorations(false)
            .skip_taskbar(true)
            .shadow(false)
            .resizable(false)
            .focused(false)
            .parent(&main)
            .and_then(|builder| builder.build())?;

        let link = SurfaceLink::default();
        let on_destroy = link.open.clone();
        window.on_window_event(move |event| {
            if let WindowEvent::Destroyed = event {
                on_destroy.close();
            }
        });
        self.links.insert(label.to_string(), link);

        // Keep keyboard focus on the host layout
        main.set_focus()?;
        Ok(())
    }

    fn update_surface(&mut self, label: &str, geometry: Geometry, color: Rgb) -> OverlayResult<()> {
        let window = self.overlay_window(label)?;
        window.set_position(self.screen_position(geometry)?)?;
        window.set_size(LogicalSize::new(geometry.width, geometry.height))?;
        self.links.entry(label.to_string()).or_default().color.set(color);
        Ok(())
    }

    fn reposition_surface(&mut self, label: &str, geometry: Geometry) -> OverlayResult<()> {
        let window = self.overlay_window(label)?;
        window.set_position(self.screen_position(geometry)?)?;
        Ok(())
    }

    fn set_surface_visible(&mut self, label: &str, visible: bool) -> OverlayResult<()> {
        let window = self.overlay_window(label)?;
        if visible {
            window.show()?;
        } else {
            window.hide()?;
        }
        Ok(())
    }

    fn render_triangle(&mut self, label: &str, color: Rgb) -> OverlayResult<()> {
        let window = self.overlay_window(label)?;
        let link = self.links.entry(label.to_string()).or_default();
        link.color.set(color);
        let open = link.open.clone();
        let background = Arc::clone(&link.color);
        let pixel_buffer = Arc::clone(&self.pixel_buffer);
        let power_preference = self.power_preference;
        let frame_interval = self.frame_interval;
        let thread_name = format!("overlay-render-{}", label);

        // Native surfaces must be created on the main thread on some platforms
        let (tx, rx) = std::sync::mpsc::channel();
        self.app.run_on_main_thread(move || {
            let instance = wgpu::Instance::default();
            let result = instance
                .create_surface(window)
                .map_err(OverlayError::from)
                .and_then(|surface| {
                    let target = WindowTarget::new(surface, pixel_buffer, open);
                    std::thread::Builder::new()
                        .name(thread_name)
                        .spawn(move || {
                            let mut renderer = TriangleRenderer::new(target, background);
                            if pollster::block_on(renderer.initialize(&instance, power_preference))
                                .is_ok()
                            {
                                renderer.run(&mut FramePacer::new(frame_interval));
                            }
                        })
                        .map(|_| ())
                        .context("Failed to spawn render thread")
                });
            let _ = tx.send(result);
        })?;

        rx.recv()
            .context("Main thread dropped the surface request")?
    }

    fn set_busy(&mut self, label: &str, busy: bool) -> OverlayResult<()> {
        self.app.emit_to(
            MAIN_WINDOW_LABEL,
            BUSY_EVENT,
            BusyPayload {
                label: label.to_string(),
                busy,
            },
        )?;
        Ok(())
    }
}

//! Wires observer → debouncer → controller for one overlay surface.
//!
//! One `Orchestrator` exists per surface and owns everything that surface
//! needs: label, cached color, debounce state, controller and the shared
//! pixel-buffer size. All inputs are handled on one task, each to
//! completion, so commands for the label are strictly serialized.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;

use super::controller::{OverlaySurfaceController, SurfaceHost};
use super::debounce::{DebounceState, ResizeDebouncer, ResizeEvent};
use super::geometry::{PixelBuffer, Rgb};
use super::observer::{GeometryObserver, LayoutSample};
use crate::config::OverlayConfig;
use crate::error::OverlayResult;

/// Events from the host window that affect overlay placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// The main window moved; overlays must follow.
    Moved,
}

pub type HostEventSender = mpsc::UnboundedSender<HostEvent>;
pub type HostEventReceiver = mpsc::UnboundedReceiver<HostEvent>;

pub fn host_event_channel() -> (HostEventSender, HostEventReceiver) {
    mpsc::unbounded_channel()
}

pub struct Orchestrator<H> {
    label: String,
    color: Rgb,
    hide_while_resizing: bool,
    debouncer: ResizeDebouncer,
    controller: OverlaySurfaceController<H>,
    pixel_buffer: Arc<PixelBuffer>,
}

impl<H: SurfaceHost> Orchestrator<H> {
    pub fn new(
        config: &OverlayConfig,
        color: Rgb,
        host: H,
        pixel_buffer: Arc<PixelBuffer>,
    ) -> Self {
        Self {
            label: config.surface_label.clone(),
            color,
            hide_while_resizing: config.hide_while_resizing,
            debouncer: ResizeDebouncer::new(config.debounce_delay()),
            controller: OverlaySurfaceController::new(host),
            pixel_buffer,
        }
    }

    /// Drive the surface until the observer runs dry.
    ///
    /// Returns an error only when the surface could not be created; every
    /// later failure is logged and the loop keeps going.
    pub async fn run(
        mut self,
        mut observer: GeometryObserver,
        mut host_events: HostEventReceiver,
    ) -> OverlayResult<()> {
        log::info!(
            "[Orchestrator] Tracking '{}' for surface '{}'",
            observer.region_id(),
            self.label
        );

        loop {
            tokio::select! {
                sample = observer.next_sample() => match sample {
                    Some(sample) => self.handle_sample(sample, Instant::now())?,
                    None => {
                        // Do not leave the overlay hidden behind the busy indicator
                        if self.debouncer.state() == DebounceState::Resizing {
                            let pending = self.debouncer.flush();
                            self.settle(pending);
                        }
                        break;
                    },
                },
                _ = self.debouncer.expired() => self.handle_timer(Instant::now()),
                Some(event) = host_events.recv() => self.handle_host_event(event),
            }
        }

        log::info!("[Orchestrator] Layout reports ended for '{}'", self.label);
        Ok(())
    }

    /// Handle one observer sample.
    ///
    /// The drawable size follows every sample immediately; only the surface
    /// update is debounced. The first sample creates the surface instead of
    /// entering the debouncer.
    pub fn handle_sample(&mut self, sample: LayoutSample, now: Instant) -> OverlayResult<()> {
        self.pixel_buffer.resize(sample.pixel_size());

        if self.controller.surface(&self.label).is_none() {
            if let Err(e) = self.controller.create(&self.label, sample.geometry) {
                log::error!("[Orchestrator] Failed to create '{}': {}", self.label, e);
                return Err(e);
            }
            if let Err(e) = self.controller.render_triangle(&self.label, self.color) {
                log::error!(
                    "[Orchestrator] Renderer for '{}' failed to start: {}",
                    self.label,
                    e
                );
            }
            return Ok(());
        }

        if let Some(ResizeEvent::Started) = self.debouncer.on_sample(sample.geometry, now) {
            self.on_resize_started();
        }
        Ok(())
    }

    pub fn handle_timer(&mut self, now: Instant) {
        let event = self.debouncer.on_timer(now);
        self.settle(event);
    }

    fn settle(&mut self, event: Option<ResizeEvent>) {
        if let Some(ResizeEvent::Settled(geometry)) = event {
            let label = self.label.clone();
            let color = self.color;

            log_dispatch(&label, "update", self.controller.update(&label, geometry, color));
            if self.hide_while_resizing {
                log_dispatch(&label, "show", self.controller.show(&label));
            }
            log_dispatch(&label, "hide busy", self.controller.hide_busy(&label));
        }
    }

    pub fn handle_host_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Moved => {
                for (label, e) in self.controller.realign_all() {
                    log_dispatch(&label, "realign", Err(e));
                }
            },
        }
    }

    fn on_resize_started(&mut self) {
        let label = self.label.clone();
        log_dispatch(&label, "show busy", self.controller.show_busy(&label));
        if self.hide_while_resizing {
            log_dispatch(&label, "hide", self.controller.hide(&label));
        }
    }
}

fn log_dispatch(label: &str, command: &str, result: OverlayResult<()>) {
    if let Err(e) = result {
        log::warn!("[Orchestrator] {} failed for '{}': {}", command, label, e);
    }
}

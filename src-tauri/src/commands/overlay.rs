//! Tauri commands the host layout uses to report its proxy region.

use std::sync::Arc;

use parking_lot::Mutex;
use tauri::{command, AppHandle, State};

use crate::app::TauriSurfaceHost;
use crate::config::overlay::snapshot;
use crate::error::{OverlayError, OverlayResult};
use crate::overlay::observer::LayoutSender;
use crate::overlay::{
    host_event_channel, layout_channel, GeometryObserver, HostEvent, HostEventSender,
    LayoutChange, Orchestrator, PixelBuffer, ProxyRegion,
};

/// Channels into the running orchestrator.
struct TrackingSession {
    region: String,
    layout: LayoutSender,
    host_events: HostEventSender,
    /// Last bounds reported for the tracked region.
    last_reported: LayoutChange,
}

impl TrackingSession {
    fn new(region: &ProxyRegion, layout: LayoutSender, host_events: HostEventSender) -> Self {
        Self {
            region: region.id.clone(),
            layout,
            host_events,
            last_reported: LayoutChange {
                region: region.id.clone(),
                bounds: region.bounds,
                device_pixel_ratio: region.device_pixel_ratio,
            },
        }
    }

    fn is_running(&self) -> bool {
        !self.layout.is_closed()
    }
}

/// Managed state: the current tracking session, if any.
#[derive(Default)]
pub struct OverlayState {
    session: Mutex<Option<TrackingSession>>,
}

impl OverlayState {
    /// Forward a main-window move to the orchestrator.
    pub fn notify_host_moved(&self) {
        if let Some(session) = self.session.lock().as_ref() {
            let _ = session.host_events.send(HostEvent::Moved);
        }
    }

    fn forward(&self, change: LayoutChange) -> OverlayResult<()> {
        let mut session = self.session.lock();
        let active = session.as_mut().ok_or(OverlayError::NotAttached)?;

        // A layout pass that leaves the region where it was is not a resize
        if change == active.last_reported {
            log::trace!("[Overlay] Unchanged bounds for '{}'", change.region);
            return Ok(());
        }
        if change.region == active.region {
            active.last_reported = change.clone();
        }

        if active.layout.send(change).is_err() {
            log::warn!(
                "[Overlay] Tracking of '{}' has stopped; dropping session",
                active.region
            );
            *session = None;
            return Err(OverlayError::NotAttached);
        }
        Ok(())
    }
}

/// Attach the proxy region and start tracking it.
///
/// `region` is `null` when the host layout could not find the element; that
/// is an initialization error and nothing is started.
#[command]
pub fn attach_proxy_region(
    app: AppHandle,
    state: State<'_, OverlayState>,
    region: Option<ProxyRegion>,
) -> Result<(), OverlayError> {
    let mut session = state.session.lock();
    if let Some(active) = session.as_ref().filter(|s| s.is_running()) {
        return Err(OverlayError::AlreadyAttached {
            id: active.region.clone(),
        });
    }

    let (layout, layout_rx) = layout_channel();
    let (host_events, host_events_rx) = host_event_channel();
    let tracking = region
        .as_ref()
        .map(|region| TrackingSession::new(region, layout, host_events));
    let observer = GeometryObserver::attach(region, layout_rx).map_err(|e| {
        log::error!("[Overlay] Tracking not started: {}", e);
        e
    })?;

    let config = snapshot();
    let pixel_buffer = Arc::new(PixelBuffer::default());
    let host = TauriSurfaceHost::new(app, &config, Arc::clone(&pixel_buffer));
    let orchestrator = Orchestrator::new(&config, observer.color(), host, pixel_buffer);
    *session = tracking;

    tauri::async_runtime::spawn(async move {
        match orchestrator.run(observer, host_events_rx).await {
            Err(e) if e.is_initialization() => {
                log::error!("[Overlay] Overlay stays inert: {}", e);
            },
            Err(e) => log::error!("[Overlay] Orchestrator stopped: {}", e),
            Ok(()) => {},
        }
    });

    Ok(())
}

/// Report a layout change of an element in the host layout.
#[command]
pub fn proxy_layout_changed(
    state: State<'_, OverlayState>,
    change: LayoutChange,
) -> Result<(), OverlayError> {
    state.forward(change)
}

//! Window event handlers.

use tauri::{Manager, Window, WindowEvent};

use super::host::MAIN_WINDOW_LABEL;
use crate::commands::overlay::OverlayState;

/// Handle window events for the application.
///
/// This is called from the Tauri builder's `on_window_event` hook.
pub fn handle_window_event(window: &Window, event: &WindowEvent) {
    if moves_overlays(window.label(), event) {
        if let Some(state) = window.app_handle().try_state::<OverlayState>() {
            state.notify_host_moved();
        }
    }
}

/// Overlays are positioned in screen space and must follow the main window.
fn moves_overlays(label: &str, event: &WindowEvent) -> bool {
    matches!(event, WindowEvent::Moved(_)) && label == MAIN_WINDOW_LABEL
}

#[cfg(test)]
mod tests {
    use super::*;
    use tauri::{PhysicalPosition, PhysicalSize};

    #[test]
    fn only_main_window_moves_realign() {
        let moved = WindowEvent::Moved(PhysicalPosition::new(40, 60));
        assert!(moves_overlays(MAIN_WINDOW_LABEL, &moved));
        assert!(!moves_overlays("wgpu1", &moved));
    }

    #[test]
    fn resize_and_focus_are_ignored() {
        let resized = WindowEvent::Resized(PhysicalSize::new(800, 600));
        assert!(!moves_overlays(MAIN_WINDOW_LABEL, &resized));
        assert!(!moves_overlays(MAIN_WINDOW_LABEL, &WindowEvent::Focused(true)));
    }
}

//! GPU overlay locked onto a proxy region of the host layout.
//!
//! ## Components
//! - `overlay`: Geometry tracking, resize debouncing, surface control, orchestration
//! - `rendering`: wgpu triangle renderer and its drawable targets
//! - `app`: Tauri window host and window event hooks
//! - `config`: Runtime overlay configuration

use tauri::Manager;

mod app;
mod commands;
pub mod config;
pub mod error;
pub mod overlay;
pub mod rendering;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    commands::logging::init_logging();

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .manage(commands::overlay::OverlayState::default())
        .on_window_event(app::events::handle_window_event)
        .invoke_handler(tauri::generate_handler![
            // Host layout bridge
            commands::overlay::attach_proxy_region,
            commands::overlay::proxy_layout_changed,
            // Configuration
            config::overlay::get_overlay_config,
            config::overlay::set_overlay_config,
            // Logging commands
            commands::logging::write_log,
            commands::logging::write_logs,
        ])
        .setup(|app| {
            if let Some(window) = app.get_webview_window(app::MAIN_WINDOW_LABEL) {
                let _ = window.show();
            }
            log::info!(
                "[App] Started with {:?}",
                config::overlay::snapshot()
            );
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

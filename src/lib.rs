pub mod capture;
pub mod config;
pub mod error;
pub mod hotkeys;
pub mod inference;
pub mod overlay;
pub mod pipeline;
pub mod preprocess;
pub mod presenter;

use log::info;
use reqwest::Client;
use tauri::{AppHandle, Manager, State};

use config::Config;
use hotkeys::Bindings;
use overlay::OverlayController;
use presenter::{OverlayState, Presenter};

/// Start a capture-analyze cycle from the page (same path as the hotkey).
#[tauri::command]
fn trigger_analysis(app: AppHandle) {
    pipeline::spawn_cycle(app);
}

/// Most recently presented render state, for page-side recovery after reload.
#[tauri::command]
fn overlay_state(presenter: State<Presenter<tauri::Wry>>) -> OverlayState {
    presenter.last()
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Look one directory up as well so `cargo run` from the crate root and
    // from a bundling wrapper both find the same .env.
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_filename("../.env");
    }

    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    tauri::Builder::default()
        .plugin(
            tauri_plugin_global_shortcut::Builder::new()
                .with_handler(|app, shortcut, event| hotkeys::handle(app, shortcut, event))
                .build(),
        )
        .setup(|app| {
            let handle = app.handle().clone();

            app.manage(Config::from_env());
            app.manage(Client::new());
            app.manage(Bindings::default());
            app.manage(Presenter::new(handle.clone()));

            let controller = OverlayController::new();
            controller.create(&handle)?;
            app.manage(controller);

            // No dock icon, no app menu: the overlay is the whole UI.
            #[cfg(target_os = "macos")]
            {
                app.set_activation_policy(tauri::ActivationPolicy::Accessory);
                let _ = handle.remove_menu();
            }

            hotkeys::register_all(&handle)?;

            info!("ghostlens ready");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![trigger_analysis, overlay_state])
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app, event| match event {
            tauri::RunEvent::ExitRequested { api, code, .. } => {
                // Keep running when the last window closes; only an explicit
                // exit (hotkey or menu quit) carries a code.
                #[cfg(target_os = "macos")]
                if code.is_none() {
                    api.prevent_exit();
                }
                #[cfg(not(target_os = "macos"))]
                let _ = (api, code);
            }
            tauri::RunEvent::Exit => {
                hotkeys::release_all(app);
            }
            #[cfg(target_os = "macos")]
            tauri::RunEvent::Reopen { .. } => {
                if let Err(err) = app.state::<OverlayController>().ensure_created(app) {
                    log::error!("failed to recreate overlay: {err:#}");
                }
            }
            _ => {}
        });
}
